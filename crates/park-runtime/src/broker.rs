//! Ownership brokers - mutual exclusion per interactive object
//!
//! Each object owns at most one avatar at a time. Acquiring preempts the
//! current occupant; releasing drops the occupancy's listener subscriptions
//! and cancels its animation. Nothing is published from here: callers turn
//! occupancy changes into avatar record writes.

use std::collections::BTreeMap;
use std::mem;

use park_core::{PresenceTime, SessionId};
use park_motion::{FrameValues, KeyframeAnimation};
use tracing::debug;

use crate::{ObjectId, ObjectKind, SceneTree, Subscription};

/// Per-object counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrokerStats {
    pub acquisitions: u64,
    pub releases: u64,
}

impl BrokerStats {
    fn add(&mut self, other: &BrokerStats) {
        self.acquisitions += other.acquisitions;
        self.releases += other.releases;
    }
}

/// The avatar an object currently owns, with everything tied to that claim
#[derive(Debug)]
pub struct Occupant {
    pub avatar: SessionId,
    subscriptions: Vec<Subscription>,
    animation: Option<KeyframeAnimation>,
}

#[derive(Debug, Default)]
pub enum Occupancy {
    #[default]
    Idle,
    Occupied(Occupant),
}

impl Occupancy {
    pub fn avatar(&self) -> Option<SessionId> {
        match self {
            Occupancy::Idle => None,
            Occupancy::Occupied(o) => Some(o.avatar),
        }
    }
}

/// Mutual-exclusion state machine of one object
#[derive(Debug)]
pub struct OwnershipBroker {
    object: ObjectId,
    kind: ObjectKind,
    occupancy: Occupancy,
    stats: BrokerStats,
}

impl OwnershipBroker {
    pub fn new(object: ObjectId, kind: ObjectKind) -> Self {
        OwnershipBroker {
            object,
            kind,
            occupancy: Occupancy::Idle,
            stats: BrokerStats::default(),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn occupant(&self) -> Option<SessionId> {
        self.occupancy.avatar()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.occupancy, Occupancy::Idle)
    }

    pub fn stats(&self) -> BrokerStats {
        self.stats
    }

    /// Take `avatar`, preempting any other occupant
    ///
    /// Returns the preempted avatar, if it was a different one.
    pub fn acquire(
        &mut self,
        avatar: SessionId,
        subscriptions: Vec<Subscription>,
    ) -> Option<SessionId> {
        let previous = self.release();
        self.occupancy = Occupancy::Occupied(Occupant {
            avatar,
            subscriptions,
            animation: None,
        });
        self.stats.acquisitions += 1;
        debug!(object = ?self.object, avatar = ?avatar, "object acquired");
        previous.filter(|p| *p != avatar)
    }

    /// Back to idle; returns the released avatar
    pub fn release(&mut self) -> Option<SessionId> {
        match mem::take(&mut self.occupancy) {
            Occupancy::Idle => None,
            Occupancy::Occupied(mut occupant) => {
                if let Some(animation) = occupant.animation.as_mut() {
                    animation.cancel();
                }
                self.stats.releases += 1;
                debug!(
                    object = ?self.object,
                    avatar = ?occupant.avatar,
                    listeners = occupant.subscriptions.len(),
                    "object released"
                );
                Some(occupant.avatar)
            }
        }
    }

    /// Start an animation for the current occupant
    pub fn animate(&mut self, mut animation: KeyframeAnimation, now: PresenceTime) -> bool {
        match &mut self.occupancy {
            Occupancy::Occupied(occupant) => {
                if let Some(previous) = occupant.animation.as_mut() {
                    previous.cancel();
                }
                animation.start(now);
                occupant.animation = Some(animation);
                true
            }
            Occupancy::Idle => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        match &self.occupancy {
            Occupancy::Occupied(o) => o.animation.as_ref().is_some_and(|a| a.is_running()),
            Occupancy::Idle => false,
        }
    }

    /// Advance the occupant's animation
    ///
    /// Returns the committed values and whether the animation just finished.
    pub fn advance_animation(&mut self, now: PresenceTime) -> Option<(Option<FrameValues>, bool)> {
        let Occupancy::Occupied(occupant) = &mut self.occupancy else {
            return None;
        };
        let animation = occupant.animation.as_mut()?;
        let values = animation.advance(now);
        let finished = animation.is_finished();
        if finished {
            occupant.animation = None;
        }
        Some((values, finished))
    }
}

/// Brokers of every object in a scene
#[derive(Debug, Default)]
pub struct BrokerTable {
    brokers: BTreeMap<ObjectId, OwnershipBroker>,
}

impl BrokerTable {
    pub fn new() -> Self {
        BrokerTable::default()
    }

    pub fn for_scene(scene: &SceneTree) -> Self {
        BrokerTable {
            brokers: scene
                .objects()
                .map(|o| (o.id, OwnershipBroker::new(o.id, o.kind)))
                .collect(),
        }
    }

    pub fn get(&self, object: ObjectId) -> Option<&OwnershipBroker> {
        self.brokers.get(&object)
    }

    pub fn get_mut(&mut self, object: ObjectId) -> Option<&mut OwnershipBroker> {
        self.brokers.get_mut(&object)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnershipBroker> {
        self.brokers.values()
    }

    pub fn occupant(&self, object: ObjectId) -> Option<SessionId> {
        self.brokers.get(&object).and_then(|b| b.occupant())
    }

    /// Object currently owning `avatar`
    pub fn hosting(&self, avatar: SessionId) -> Option<ObjectId> {
        self.brokers
            .values()
            .find(|b| b.occupant() == Some(avatar))
            .map(|b| b.object)
    }

    /// Claim an object with listener subscriptions; returns the preempted avatar
    pub fn claim(
        &mut self,
        object: ObjectId,
        avatar: SessionId,
        subscriptions: Vec<Subscription>,
    ) -> Option<SessionId> {
        self.brokers
            .get_mut(&object)
            .and_then(|b| b.acquire(avatar, subscriptions))
    }

    /// Record an occupant learned from the document
    ///
    /// Idempotent for the current occupant; otherwise preempts it and returns
    /// the preempted avatar.
    pub fn record_occupant(&mut self, object: ObjectId, avatar: SessionId) -> Option<SessionId> {
        let broker = self.brokers.get_mut(&object)?;
        if broker.occupant() == Some(avatar) {
            return None;
        }
        broker.acquire(avatar, Vec::new())
    }

    /// Release `object` only if `avatar` occupies it
    pub fn vacate(&mut self, object: ObjectId, avatar: SessionId) -> bool {
        match self.brokers.get_mut(&object) {
            Some(broker) if broker.occupant() == Some(avatar) => broker.release().is_some(),
            _ => false,
        }
    }

    pub fn release(&mut self, object: ObjectId) -> Option<SessionId> {
        self.brokers.get_mut(&object).and_then(|b| b.release())
    }

    /// Release every object; returns how many were occupied
    pub fn release_all(&mut self) -> usize {
        self.brokers
            .values_mut()
            .filter_map(|b| b.release())
            .count()
    }

    pub fn stats(&self) -> BrokerStats {
        let mut total = BrokerStats::default();
        for broker in self.brokers.values() {
            total.add(&broker.stats);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListenerKind, ListenerRegistry};
    use park_core::{Locator, Rect};
    use park_motion::Keyframe;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn table() -> (SceneTree, BrokerTable) {
        let mut scene = SceneTree::new(Locator::new("cursor-park"));
        scene.add(ObjectKind::Bench, Rect::new(0.0, 0.0, 60.0, 30.0));
        scene.add(ObjectKind::Mat, Rect::new(100.0, 0.0, 50.0, 30.0));
        let brokers = BrokerTable::for_scene(&scene);
        (scene, brokers)
    }

    #[test]
    fn test_acquire_preempts() {
        let mut broker = OwnershipBroker::new(ObjectId(0), ObjectKind::Bench);
        assert!(broker.is_idle());
        assert_eq!(broker.acquire(SessionId::new(1), Vec::new()), None);
        assert_eq!(broker.acquire(SessionId::new(2), Vec::new()), Some(SessionId::new(1)));
        assert_eq!(broker.occupant(), Some(SessionId::new(2)));
        assert_eq!(broker.stats(), BrokerStats { acquisitions: 2, releases: 1 });
    }

    #[test]
    fn test_release_drops_subscriptions_and_cancels_animation() {
        let registry = ListenerRegistry::new();
        let mut broker = OwnershipBroker::new(ObjectId(0), ObjectKind::Slide);
        broker.acquire(
            SessionId::new(1),
            vec![
                registry.subscribe(ListenerKind::CaptureClick, ObjectId(0)),
                registry.subscribe(ListenerKind::KeyDown, ObjectId(0)),
            ],
        );
        let anim = KeyframeAnimation::new(Duration::from_millis(100), [Keyframe::at(100.0).x(1.0)]);
        assert!(broker.animate(anim, PresenceTime::ZERO));
        assert!(broker.is_animating());
        assert_eq!(registry.len(), 2);

        assert_eq!(broker.release(), Some(SessionId::new(1)));
        assert!(registry.is_empty());
        assert!(!broker.is_animating());
        assert_eq!(broker.release(), None);
        assert_eq!(broker.stats().releases, 1);
    }

    #[test]
    fn test_record_occupant_is_idempotent() {
        let (_, mut brokers) = table();
        let a = SessionId::new(1);
        assert_eq!(brokers.record_occupant(ObjectId(0), a), None);
        assert_eq!(brokers.record_occupant(ObjectId(0), a), None);
        assert_eq!(brokers.get(ObjectId(0)).unwrap().stats().acquisitions, 1);
        assert_eq!(brokers.hosting(a), Some(ObjectId(0)));
        assert_eq!(brokers.record_occupant(ObjectId(0), SessionId::new(2)), Some(a));
    }

    #[test]
    fn test_vacate_only_matching_occupant() {
        let (_, mut brokers) = table();
        let a = SessionId::new(1);
        brokers.record_occupant(ObjectId(1), a);
        assert!(!brokers.vacate(ObjectId(1), SessionId::new(2)));
        assert!(brokers.vacate(ObjectId(1), a));
        assert!(!brokers.vacate(ObjectId(1), a));
        assert_eq!(brokers.stats().releases, 1);
    }

    #[test]
    fn test_animation_finishes() {
        let mut broker = OwnershipBroker::new(ObjectId(0), ObjectKind::Slide);
        broker.acquire(SessionId::new(1), Vec::new());
        let anim = KeyframeAnimation::new(
            Duration::from_millis(100),
            [Keyframe::at(0.0).x(0.0), Keyframe::at(100.0).x(10.0)],
        );
        broker.animate(anim, PresenceTime::ZERO);

        let (values, done) = broker.advance_animation(PresenceTime::from_millis(10)).unwrap();
        assert_eq!(values.unwrap().x, Some(0.0));
        assert!(!done);

        let (values, done) = broker.advance_animation(PresenceTime::from_millis(100)).unwrap();
        assert_eq!(values.unwrap().x, Some(10.0));
        assert!(done);
        assert!(broker.advance_animation(PresenceTime::from_millis(200)).is_none());
    }

    #[test]
    fn test_release_all() {
        let (_, mut brokers) = table();
        brokers.record_occupant(ObjectId(0), SessionId::new(1));
        brokers.record_occupant(ObjectId(1), SessionId::new(2));
        assert_eq!(brokers.release_all(), 2);
        assert!(brokers.iter().all(|b| b.is_idle()));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Claim { object: u32, avatar: u128, listeners: usize },
        Record { object: u32, avatar: u128 },
        Vacate { object: u32, avatar: u128 },
        Release { object: u32 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..2, 1u128..4, 0usize..3)
                .prop_map(|(object, avatar, listeners)| Op::Claim { object, avatar, listeners }),
            (0u32..2, 1u128..4).prop_map(|(object, avatar)| Op::Record { object, avatar }),
            (0u32..2, 1u128..4).prop_map(|(object, avatar)| Op::Vacate { object, avatar }),
            (0u32..2).prop_map(|object| Op::Release { object }),
        ]
    }

    proptest! {
        #[test]
        fn prop_occupancy_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let (_, mut brokers) = table();
            let registry = ListenerRegistry::new();
            // object -> (occupant, listeners held by the claim)
            let mut model: BTreeMap<u32, (u128, usize)> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Claim { object, avatar, listeners } => {
                        let subs = (0..listeners)
                            .map(|_| {
                                registry.subscribe(ListenerKind::CaptureClick, ObjectId(object))
                            })
                            .collect();
                        brokers.claim(ObjectId(object), SessionId::new(avatar), subs);
                        model.insert(object, (avatar, listeners));
                    }
                    Op::Record { object, avatar } => {
                        brokers.record_occupant(ObjectId(object), SessionId::new(avatar));
                        if model.get(&object).map(|m| m.0) != Some(avatar) {
                            model.insert(object, (avatar, 0));
                        }
                    }
                    Op::Vacate { object, avatar } => {
                        brokers.vacate(ObjectId(object), SessionId::new(avatar));
                        if model.get(&object).map(|m| m.0) == Some(avatar) {
                            model.remove(&object);
                        }
                    }
                    Op::Release { object } => {
                        brokers.release(ObjectId(object));
                        model.remove(&object);
                    }
                }

                for broker in brokers.iter() {
                    let expected = model.get(&broker.object().0).map(|m| SessionId::new(m.0));
                    prop_assert_eq!(broker.occupant(), expected);
                    let stats = broker.stats();
                    let occupied = u64::from(expected.is_some());
                    prop_assert_eq!(stats.acquisitions - stats.releases, occupied);
                }
                // Released or preempted claims never leave listeners behind
                prop_assert_eq!(registry.len(), model.values().map(|m| m.1).sum::<usize>());
            }
        }
    }
}
