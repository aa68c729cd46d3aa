//! Presence session - lifecycle of one client in a shared park
//!
//! The session attaches to a presence document, publishes the local avatar
//! record, mirrors every record into views and routes input to interactive
//! objects. All entry points run to completion; local writes are visible
//! immediately and reach other sessions on the next [`PresenceSession::sync`].

use park_core::{
    Action, AvatarRecord, AvatarUpdate, DocumentAddress, ParkError, ParkResult, Patch, Point,
    SessionId,
};
use park_state::{DocHandle, DocumentRepo};
use tracing::{debug, error, info, warn};

use crate::{
    slide_descent, AvatarView, BrokerStats, BrokerTable, Host, InputEvent, Interpretation, Key,
    ListenerKind, ListenerRegistry, ObjectId, PatchInterpreter, PresenceMirror, SceneTree,
    SessionContext, SessionStats,
};

/// One client's presence in the park
pub struct PresenceSession<R: DocumentRepo> {
    ctx: SessionContext,
    repo: R,
    handle: Option<DocHandle>,
    scene: SceneTree,
    mirror: PresenceMirror,
    brokers: BrokerTable,
    registry: ListenerRegistry,
    /// Latest pointer position, page coordinates
    pointer: Point,
    stats: SessionStats,
}

impl<R: DocumentRepo> PresenceSession<R> {
    pub fn new(ctx: SessionContext, repo: R, scene: SceneTree) -> Self {
        let mirror = PresenceMirror::new(ctx.id(), ctx.config().smoother());
        let brokers = BrokerTable::for_scene(&scene);
        PresenceSession {
            ctx,
            repo,
            handle: None,
            scene,
            mirror,
            brokers,
            registry: ListenerRegistry::new(),
            pointer: Point::ORIGIN,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.ctx.id()
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn mirror(&self) -> &PresenceMirror {
        &self.mirror
    }

    pub fn brokers(&self) -> &BrokerTable {
        &self.brokers
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn handle(&self) -> Option<&DocHandle> {
        self.handle.as_ref()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn broker_stats(&self) -> BrokerStats {
        self.brokers.stats()
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Address of the attached document
    pub fn document_address(&self) -> Option<&DocumentAddress> {
        self.handle.as_ref().map(|h| h.address())
    }

    /// The local avatar's view
    pub fn local_view(&self) -> ParkResult<&AvatarView> {
        self.mirror.local().ok_or(ParkError::NoLocalAvatar)
    }

    /// Host of the local avatar, once mirrored
    pub fn local_host(&self) -> Option<Host> {
        self.mirror.local().map(|v| v.host)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Attach to `address`, or to a brand-new document
    ///
    /// An address that is malformed or cannot be found falls back to creating
    /// a document; the failure is only logged. Joining the attached address
    /// again is a no-op.
    pub fn join(&mut self, address: Option<&str>) -> ParkResult<DocumentAddress> {
        if let (Some(requested), Some(current)) = (address, self.document_address()) {
            if requested == current.as_str() {
                return Ok(current.clone());
            }
        }

        if let Some(current) = self.document_address() {
            // Documents are never merged: switching drops all local presence
            info!(from = %current, to = ?address, "switching presence document");
            self.leave();
        }

        let mut found = None;
        if let Some(requested) = address {
            match DocumentAddress::parse(requested).and_then(|a| self.repo.find(&a)) {
                Ok(handle) => found = Some(handle),
                Err(ParkError::InvalidAddress(a)) => {
                    warn!(address = %a, "ignoring malformed document address")
                }
                Err(e) => error!(address = requested, error = %e, "failed to find document"),
            }
        }

        let handle = match found {
            Some(handle) => handle,
            None => self.repo.create()?,
        };
        let address = handle.address().clone();
        let hydration = handle.document().hydration_patches();
        self.handle = Some(handle);

        // Existing records go through the same pipeline as live changes
        self.interpret(&hydration);

        let identity = self.ctx.identity();
        let record = AvatarRecord::joining(
            identity.color(),
            identity.scale(),
            self.pointer,
            self.scene.root_locator().clone(),
        );
        let local = self.id();
        if let Some(handle) = self.handle.as_mut() {
            let patches = handle.change(|tx| tx.put_record(local, record));
            self.stats.publishes += 1;
            self.interpret(&patches);
        }

        info!(
            address = %address,
            avatar = %local,
            peers = self.mirror.len().saturating_sub(1),
            "joined park"
        );
        if let Err(e) = self.sync() {
            warn!(error = %e, "initial sync failed, continuing offline");
        }
        Ok(address)
    }

    /// Delete the local record (best effort) and tear down local state
    pub fn leave(&mut self) {
        let local = self.id();
        if let Some(mut handle) = self.handle.take() {
            if handle.document().contains(local) {
                let patches = handle.change(|tx| tx.delete_record(local));
                self.interpret(&patches);
            }
            if let Err(e) = handle.flush() {
                warn!(address = %handle.address(), error = %e, "could not deliver leave");
            }
            info!(address = %handle.address(), avatar = %local, "left park");
        }

        let released = self.brokers.release_all();
        self.mirror.clear();
        debug!(released, listeners = self.registry.len(), "presence state cleared");
    }

    /// Exchange changes with the relay and interpret remote patches
    ///
    /// Returns the number of patches applied. On failure local state is
    /// untouched and pending writes stay queued.
    pub fn sync(&mut self) -> ParkResult<usize> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(ParkError::NotAttached);
        };
        let patches = match handle.sync() {
            Ok(patches) => patches,
            Err(e) => {
                warn!(address = %handle.address(), error = %e, "sync failed");
                return Err(e);
            }
        };
        Ok(self.interpret(&patches).applied)
    }

    /// One animation frame; returns the number of views moved by smoothing
    pub fn tick(&mut self) -> usize {
        let now = self.ctx.now();
        let moved = self.mirror.tick(now);

        if let Some(object) = self.brokers.hosting(self.id()) {
            let step = self
                .brokers
                .get_mut(object)
                .and_then(|b| b.advance_animation(now));
            if let Some((values, finished)) = step {
                let mut update = AvatarUpdate::new();
                if let Some(v) = values {
                    update.x = v.x;
                    update.y = v.y;
                    update.rotation = v.rotation;
                }
                if finished {
                    update = update.action(Action::Standing);
                }
                if !update.is_empty() {
                    self.publish_self(update);
                }
            }
        }
        moved
    }

    // ------------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------------

    /// Write fields of the local record; `false` if the local avatar is not
    /// mirrored (not joined, or already left)
    pub fn publish_self(&mut self, update: AvatarUpdate) -> bool {
        let local = self.id();
        if !self.mirror.contains(local) || update.is_empty() {
            return false;
        }
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let patches = handle.change(|tx| tx.update(local, &update));
        self.stats.publishes += 1;
        self.interpret(&patches);
        true
    }

    /// Remember the pointer; publish it while the avatar roams the root space
    pub fn track_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Point::new(x, y);
        if self.local_host().is_some_and(Host::is_root) {
            self.publish_self(AvatarUpdate::new().x(x).y(y));
        }
    }

    /// Give the local avatar back to the root space at the last pointer
    pub fn return_to_root(&mut self) -> bool {
        self.publish_self(
            AvatarUpdate::new()
                .parent(self.scene.root_locator().clone())
                .action(Action::Pointing)
                .position(self.pointer)
                .rotation(0.0),
        )
    }

    // ------------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------------

    /// Hand the local avatar to `object`, preempting any occupant
    ///
    /// A silent no-op when the local avatar is not mirrored.
    pub fn acquire(&mut self, object: ObjectId, point: Point) -> ParkResult<()> {
        let local = self.id();
        let Some(view) = self.mirror.local() else {
            return Ok(());
        };
        let (current, scale) = (view.host, view.scale);
        let target = self
            .scene
            .object(object)
            .ok_or_else(|| ParkError::UnknownObject(format!("{:?}", object)))?;
        let (kind, rect, locator) = (target.kind, target.rect, target.locator.clone());
        let profile = kind.profile();

        if let Some(previous) = current.object() {
            if previous != object {
                self.brokers.vacate(previous, local);
            }
        }

        let mut subscriptions = vec![self.registry.subscribe(ListenerKind::CaptureClick, object)];
        if profile.wants_keys() {
            subscriptions.push(self.registry.subscribe(ListenerKind::KeyDown, object));
            subscriptions.push(self.registry.subscribe(ListenerKind::KeyUp, object));
        }
        if let Some(preempted) = self.brokers.claim(object, local, subscriptions) {
            debug!(object = ?object, preempted = ?preempted, "claimed occupied object");
        }

        let width = self.ctx.config().avatar_width(scale);
        let offset = profile.place(&rect, &point, width);
        self.publish_self(
            AvatarUpdate::new()
                .parent(locator)
                .action(profile.pose)
                .position(offset)
                .rotation(0.0),
        );

        if profile.descent {
            let animation = slide_descent(&rect, width, self.ctx.config().slide_duration());
            let now = self.ctx.now();
            if let Some(broker) = self.brokers.get_mut(object) {
                broker.animate(animation, now);
            }
        }
        Ok(())
    }

    /// Release whatever object holds the local avatar and return to the root
    pub fn release_local(&mut self) -> bool {
        match self.brokers.hosting(self.id()) {
            Some(object) => {
                self.brokers.release(object);
                self.return_to_root()
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove(p) => self.track_pointer(p.x, p.y),
            InputEvent::Click(p) => self.on_click(p),
            InputEvent::KeyDown(key) => {
                for object in self.registry.owners(ListenerKind::KeyDown) {
                    self.on_key_down(object, key);
                }
            }
            InputEvent::KeyUp(key) => {
                for object in self.registry.owners(ListenerKind::KeyUp) {
                    self.on_key_up(object, key);
                }
            }
        }
    }

    fn on_click(&mut self, point: Point) {
        let hit = self.scene.hit_test(&point);

        // An occupied object captures every click
        if let Some(owner) = self.registry.capture_owner() {
            if hit == Some(owner) {
                self.brokers.release(owner);
                self.return_to_root();
            } else {
                self.stats.suppressed_clicks += 1;
                debug!(owner = ?owner, "click captured by occupied object");
            }
            return;
        }

        let Some(object) = hit else {
            return;
        };
        if !self.local_host().is_some_and(Host::is_root) {
            return;
        }
        match self.brokers.occupant(object) {
            None => {
                if let Err(e) = self.acquire(object, point) {
                    warn!(object = ?object, error = %e, "acquire failed");
                }
            }
            Some(other) => debug!(object = ?object, occupant = ?other, "object already occupied"),
        }
    }

    fn on_key_down(&mut self, object: ObjectId, key: Key) {
        let Some((kind, rect)) = self.scene.object(object).map(|o| (o.kind, o.rect)) else {
            return;
        };
        let Ok(view) = self.local_view() else {
            return;
        };
        let profile = kind.profile();

        let delta = match key {
            Key::ArrowLeft => Some(-self.ctx.config().nudge_step),
            Key::ArrowRight => Some(self.ctx.config().nudge_step),
            _ => None,
        };
        if let Some(delta) = delta {
            let width = self.ctx.config().avatar_width(view.scale);
            if let Some(x) = profile.nudge(&rect, view.target.x, delta, width) {
                self.publish_self(AvatarUpdate::new().x(x));
                return;
            }
        }

        if let Some(pose) = profile.hold_pose(key) {
            if view.action != pose {
                self.publish_self(AvatarUpdate::new().action(pose));
            }
        }
    }

    fn on_key_up(&mut self, object: ObjectId, key: Key) {
        let Some(kind) = self.scene.object(object).map(|o| o.kind) else {
            return;
        };
        let profile = kind.profile();
        if profile.hold_pose(key).is_some() {
            self.publish_self(AvatarUpdate::new().action(profile.pose));
        }
    }

    // ------------------------------------------------------------------------
    // Patch pipeline
    // ------------------------------------------------------------------------

    fn interpret(&mut self, patches: &[Patch]) -> Interpretation {
        if patches.is_empty() {
            return Interpretation::default();
        }
        let now = self.ctx.now();
        let outcome = PatchInterpreter::new(
            &mut self.mirror,
            &self.scene,
            &mut self.brokers,
            &mut self.stats,
        )
        .apply_batch(patches, now);

        if !outcome.preempted.is_empty() {
            self.stats.preemptions += outcome.preempted.len() as u64;
            info!(objects = ?outcome.preempted, "local avatar preempted, returning to root");
            self.return_to_root();
        }
        outcome
    }
}

impl<R: DocumentRepo> Drop for PresenceSession<R> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectKind, ParkConfig};
    use park_core::{Locator, SessionIdentity};
    use park_state::{MemoryRelay, MemoryRepo};
    use park_time::ManualClock;
    use std::sync::Arc;

    fn session(relay: &MemoryRelay, seed: u64, clock: &ManualClock) -> PresenceSession<MemoryRepo> {
        let ctx = SessionContext::new(
            SessionIdentity::seeded(seed),
            ParkConfig::default(),
            Arc::new(clock.clone()),
        )
        .unwrap();
        PresenceSession::new(
            ctx,
            MemoryRepo::seeded(relay.clone(), seed),
            SceneTree::standard(Locator::new("cursor-park")),
        )
    }

    fn center(s: &PresenceSession<MemoryRepo>, kind: ObjectKind) -> (ObjectId, Point) {
        let id = s.scene().find(kind).unwrap();
        let r = s.scene().object(id).unwrap().rect;
        (id, Point::new(r.x + r.width / 2.0, r.y + r.height / 2.0))
    }

    #[test]
    fn test_join_creates_document_and_local_record() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.track_pointer(30.0, 40.0);
        assert!(s.mirror().is_empty());

        let address = s.join(None).unwrap();
        assert!(DocumentAddress::is_valid(address.as_str()));
        assert_eq!(s.document_address(), Some(&address));

        let view = s.mirror().local().unwrap();
        assert_eq!(view.position, Point::new(30.0, 40.0));
        assert_eq!(view.action, Action::Pointing);
        assert_eq!(view.host, Host::Root);
        assert_eq!(relay.log_len(&address), 1);
    }

    #[test]
    fn test_join_bad_address_falls_back_to_create() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        let a = s.join(Some("not-an-address")).unwrap();
        assert!(s.is_attached());

        let mut t = session(&relay, 2, &clock);
        let b = t.join(Some("park:0123456789abcdef0123456789abcdef")).unwrap();
        assert_ne!(a, b);
        assert_eq!(relay.document_count(), 2);
    }

    #[test]
    fn test_join_same_address_is_noop() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        let a = s.join(None).unwrap();
        let publishes = s.stats().publishes;
        assert_eq!(s.join(Some(a.as_str())).unwrap(), a);
        assert_eq!(s.stats().publishes, publishes);
    }

    #[test]
    fn test_publish_before_join_is_noop() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        assert!(!s.publish_self(AvatarUpdate::new().x(1.0)));
        assert_eq!(s.sync(), Err(ParkError::NotAttached));
    }

    #[test]
    fn test_pointer_published_only_at_root() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();

        s.handle_input(InputEvent::PointerMove(Point::new(5.0, 6.0)));
        assert_eq!(s.mirror().local().unwrap().position, Point::new(5.0, 6.0));

        let (bench, p) = center(&s, ObjectKind::Bench);
        s.handle_input(InputEvent::Click(p));
        assert_eq!(s.local_host(), Some(Host::Object(bench)));
        let seated = s.mirror().local().unwrap().position;

        s.handle_input(InputEvent::PointerMove(Point::new(500.0, 600.0)));
        assert_eq!(s.mirror().local().unwrap().position, seated);
        assert_eq!(s.pointer(), Point::new(500.0, 600.0));
    }

    #[test]
    fn test_click_protocol() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        s.track_pointer(1.0, 2.0);

        let (bench, p) = center(&s, ObjectKind::Bench);
        s.handle_input(InputEvent::Click(p));
        assert_eq!(s.brokers().occupant(bench), Some(s.id()));
        assert_eq!(s.mirror().local().unwrap().action, Action::Sitting);
        assert_eq!(s.registry().capture_owner(), Some(bench));

        // Clicks elsewhere are swallowed while seated
        let (_, mat) = center(&s, ObjectKind::Mat);
        s.handle_input(InputEvent::Click(mat));
        assert_eq!(s.stats().suppressed_clicks, 1);
        assert_eq!(s.local_host(), Some(Host::Object(bench)));

        // Clicking the bench again gives the avatar back to the park
        s.handle_input(InputEvent::Click(p));
        let view = s.mirror().local().unwrap();
        assert_eq!(view.host, Host::Root);
        assert_eq!(view.action, Action::Pointing);
        assert_eq!(view.position, Point::new(1.0, 2.0));
        assert!(s.registry().is_empty());
        assert_eq!(
            s.brokers().get(bench).unwrap().stats(),
            BrokerStats { acquisitions: 1, releases: 1 }
        );
    }

    #[test]
    fn test_handoff_releases_previous_host_once() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();

        let (bench, bp) = center(&s, ObjectKind::Bench);
        let (rock, rp) = center(&s, ObjectKind::Rock);
        s.acquire(bench, bp).unwrap();
        s.acquire(rock, rp).unwrap();

        assert_eq!(s.brokers().get(bench).unwrap().stats().releases, 1);
        assert!(s.brokers().get(bench).unwrap().is_idle());
        assert_eq!(s.brokers().occupant(rock), Some(s.id()));
        assert_eq!(s.local_host(), Some(Host::Object(rock)));
        // Only the rock's listeners remain
        assert_eq!(s.registry().owners(ListenerKind::CaptureClick), vec![rock]);
    }

    #[test]
    fn test_bench_keys() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        let (_, p) = center(&s, ObjectKind::Bench);
        s.handle_input(InputEvent::Click(p));
        let x = s.mirror().local().unwrap().position.x;

        s.handle_input(InputEvent::KeyDown(Key::ArrowRight));
        assert_eq!(s.mirror().local().unwrap().position.x, x + 2.0);
        s.handle_input(InputEvent::KeyDown(Key::ArrowLeft));
        s.handle_input(InputEvent::KeyDown(Key::ArrowLeft));
        assert!((s.mirror().local().unwrap().position.x - (x - 2.0)).abs() < 1e-9);

        s.handle_input(InputEvent::KeyDown(Key::ArrowUp));
        assert_eq!(s.mirror().local().unwrap().action, Action::SittingForwards);
        s.handle_input(InputEvent::KeyUp(Key::ArrowUp));
        assert_eq!(s.mirror().local().unwrap().action, Action::Sitting);
    }

    #[test]
    fn test_nudge_stops_at_edge() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        let (bench, _) = center(&s, ObjectKind::Bench);
        let rect = s.scene().object(bench).unwrap().rect;
        s.handle_input(InputEvent::Click(Point::new(rect.x + 1.0, rect.y + 1.0)));
        assert_eq!(s.mirror().local().unwrap().position.x, 0.0);

        let publishes = s.stats().publishes;
        s.handle_input(InputEvent::KeyDown(Key::ArrowLeft));
        assert_eq!(s.stats().publishes, publishes);
    }

    #[test]
    fn test_mat_ignores_keys() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        let (_, p) = center(&s, ObjectKind::Mat);
        s.handle_input(InputEvent::Click(p));
        assert_eq!(s.mirror().local().unwrap().action, Action::Crouching);
        assert!(s.registry().owners(ListenerKind::KeyDown).is_empty());

        let publishes = s.stats().publishes;
        s.handle_input(InputEvent::KeyDown(Key::ArrowRight));
        assert_eq!(s.stats().publishes, publishes);
    }

    #[test]
    fn test_slide_descent_ends_standing() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        let (slide, p) = center(&s, ObjectKind::Slide);
        s.handle_input(InputEvent::Click(p));
        assert_eq!(s.mirror().local().unwrap().action, Action::Sliding);
        assert!(s.brokers().get(slide).unwrap().is_animating());

        let start_y = s.mirror().local().unwrap().position.y;
        for _ in 0..50 {
            clock.advance_millis(16);
            s.tick();
        }
        let view = s.mirror().local().unwrap();
        assert_eq!(view.action, Action::Standing);
        assert!(view.position.y > start_y);
        assert_eq!(view.rotation, 0.0);
        assert!(!s.brokers().get(slide).unwrap().is_animating());
        assert_eq!(s.local_host(), Some(Host::Object(slide)));
    }

    #[test]
    fn test_release_cancels_slide() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();
        let (slide, p) = center(&s, ObjectKind::Slide);
        s.handle_input(InputEvent::Click(p));
        clock.advance_millis(100);
        s.tick();

        assert!(s.release_local());
        assert!(!s.brokers().get(slide).unwrap().is_animating());
        let publishes = s.stats().publishes;
        clock.advance_millis(1_000);
        s.tick();
        assert_eq!(s.stats().publishes, publishes);
        assert_eq!(s.mirror().local().unwrap().action, Action::Pointing);
    }

    #[test]
    fn test_leave_clears_state() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        let address = s.join(None).unwrap();
        let (_, p) = center(&s, ObjectKind::Bench);
        s.handle_input(InputEvent::Click(p));

        s.leave();
        assert!(!s.is_attached());
        assert!(s.mirror().is_empty());
        assert!(s.registry().is_empty());
        assert!(s.brokers().iter().all(|b| b.is_idle()));
        assert!(!s.publish_self(AvatarUpdate::new().x(1.0)));

        // The deletion reached the relay
        let mut probe = MemoryRepo::seeded(relay.clone(), 99);
        let handle = probe.find(&address).unwrap();
        assert!(handle.document().is_empty());
    }

    #[test]
    fn test_offline_sync_keeps_session_usable() {
        let relay = MemoryRelay::new();
        let clock = ManualClock::new();
        let mut s = session(&relay, 1, &clock);
        s.join(None).unwrap();

        relay.set_online(false);
        s.track_pointer(9.0, 9.0);
        assert_eq!(s.sync(), Err(ParkError::RelayUnavailable));
        assert_eq!(s.mirror().local().unwrap().position, Point::new(9.0, 9.0));

        relay.set_online(true);
        assert!(s.sync().is_ok());
        assert_eq!(s.handle().unwrap().pending(), 0);
    }
}
