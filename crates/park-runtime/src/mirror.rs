//! Presence mirror - local views of every avatar in the document
//!
//! Each avatar record is mirrored as an [`AvatarView`]. Remote views get a
//! motion smoother; its output moves the rendered position only while the
//! avatar is pointing.

use std::collections::{BTreeMap, HashMap};

use park_core::{Action, ParkError, ParkResult, Point, PresenceTime, SessionId};
use park_motion::{MotionSmoother, SmootherConfig};
use tracing::{debug, trace};

use crate::Host;

/// Local visual state of one avatar
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarView {
    pub id: SessionId,
    pub action: Action,
    pub color: String,
    pub rotation: f64,
    pub scale: f64,
    /// Rendered position
    pub position: Point,
    /// Latest replicated position
    pub target: Point,
    pub host: Host,
    pub is_self: bool,
}

impl AvatarView {
    fn new(id: SessionId, is_self: bool) -> Self {
        AvatarView {
            id,
            action: Action::Pointing,
            color: String::from("black"),
            rotation: 0.0,
            scale: 1.0,
            position: Point::ORIGIN,
            target: Point::ORIGIN,
            host: Host::Root,
            is_self,
        }
    }

    /// Place immediately, bypassing smoothing
    pub fn place(&mut self, p: Point) {
        self.position = p;
        self.target = p;
    }
}

/// Map of avatar views plus their smoothers
#[derive(Debug)]
pub struct PresenceMirror {
    local: SessionId,
    views: BTreeMap<SessionId, AvatarView>,
    smoothers: HashMap<SessionId, MotionSmoother>,
    smoother_config: SmootherConfig,
}

impl PresenceMirror {
    pub fn new(local: SessionId, smoother_config: SmootherConfig) -> Self {
        PresenceMirror {
            local,
            views: BTreeMap::new(),
            smoothers: HashMap::new(),
            smoother_config,
        }
    }

    pub fn local_id(&self) -> SessionId {
        self.local
    }

    /// Create a root-hosted view; `false` if it already exists
    pub fn spawn(&mut self, id: SessionId) -> bool {
        if self.views.contains_key(&id) {
            return false;
        }
        let is_self = id == self.local;
        self.views.insert(id, AvatarView::new(id, is_self));
        if !is_self {
            self.smoothers
                .insert(id, MotionSmoother::new(self.smoother_config.clone()));
        }
        debug!(avatar = ?id, is_self, "spawned avatar view");
        true
    }

    pub fn get(&self, id: SessionId) -> Option<&AvatarView> {
        self.views.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut AvatarView> {
        self.views.get_mut(&id)
    }

    /// The local avatar's view, once its record has been mirrored
    pub fn local(&self) -> Option<&AvatarView> {
        self.views.get(&self.local)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn views(&self) -> impl Iterator<Item = &AvatarView> {
        self.views.values()
    }

    /// Views currently hosted by `host`
    pub fn hosted_by(&self, host: Host) -> Vec<SessionId> {
        self.views
            .values()
            .filter(|v| v.host == host)
            .map(|v| v.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn smoother_count(&self) -> usize {
        self.smoothers.len()
    }

    /// Move a view to `host`; returns the previous host if it changed
    pub fn relocate(&mut self, id: SessionId, host: Host) -> ParkResult<Option<Host>> {
        let view = self
            .views
            .get_mut(&id)
            .ok_or(ParkError::AvatarNotFound(id))?;
        if view.host == host {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut view.host, host);
        debug!(avatar = ?id, from = ?previous, to = ?host, "relocated avatar view");
        Ok(Some(previous))
    }

    /// Remove a view and dispose its smoother
    pub fn remove(&mut self, id: SessionId) -> Option<AvatarView> {
        if let Some(mut smoother) = self.smoothers.remove(&id) {
            smoother.dispose();
        }
        let view = self.views.remove(&id);
        if view.is_some() {
            debug!(avatar = ?id, "removed avatar view");
        }
        view
    }

    /// Feed a replicated position sample to the avatar's smoother
    pub fn feed_motion(
        &mut self,
        id: SessionId,
        point: Point,
        now: PresenceTime,
    ) -> ParkResult<()> {
        let view = self
            .views
            .get_mut(&id)
            .ok_or(ParkError::AvatarNotFound(id))?;
        view.target = point;

        match self.smoothers.get_mut(&id) {
            Some(smoother) => {
                if let Some(p) = smoother.add_point(point, now) {
                    view.position = p;
                }
            }
            None => view.position = point,
        }
        Ok(())
    }

    /// Drop in-flight smoothing (pose left pointing)
    pub fn interrupt_motion(&mut self, id: SessionId) {
        if let Some(smoother) = self.smoothers.get_mut(&id) {
            smoother.interrupt();
        }
    }

    /// Advance every smoother one frame; returns the number of views moved
    pub fn tick(&mut self, now: PresenceTime) -> usize {
        let mut moved = 0;
        for (id, smoother) in &mut self.smoothers {
            let Some(p) = smoother.tick(now) else {
                continue;
            };
            if let Some(view) = self.views.get_mut(id) {
                if view.action == Action::Pointing {
                    view.position = p;
                    moved += 1;
                }
            }
        }
        if moved > 0 {
            trace!(moved, "smoothed frame");
        }
        moved
    }

    /// Remove every view, disposing all smoothers
    pub fn clear(&mut self) {
        for smoother in self.smoothers.values_mut() {
            smoother.dispose();
        }
        self.smoothers.clear();
        self.views.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectId;

    fn mirror() -> PresenceMirror {
        PresenceMirror::new(SessionId::new(1), SmootherConfig::default())
    }

    #[test]
    fn test_only_remote_views_get_smoothers() {
        let mut m = mirror();
        assert!(m.spawn(SessionId::new(1)));
        assert!(m.spawn(SessionId::new(2)));
        assert!(!m.spawn(SessionId::new(2)));
        assert_eq!(m.len(), 2);
        assert_eq!(m.smoother_count(), 1);
        assert!(m.local().unwrap().is_self);
    }

    #[test]
    fn test_relocate_reports_previous_host() {
        let mut m = mirror();
        let id = SessionId::new(2);
        m.spawn(id);
        assert_eq!(m.relocate(id, Host::Root).unwrap(), None);
        assert_eq!(m.relocate(id, Host::Object(ObjectId(0))).unwrap(), Some(Host::Root));
        assert_eq!(m.hosted_by(Host::Object(ObjectId(0))), vec![id]);
        assert_eq!(
            m.relocate(SessionId::new(9), Host::Root),
            Err(ParkError::AvatarNotFound(SessionId::new(9)))
        );
    }

    #[test]
    fn test_smoothed_motion_only_while_pointing() {
        let mut m = mirror();
        let id = SessionId::new(2);
        m.spawn(id);
        let t = PresenceTime::from_millis;

        m.feed_motion(id, Point::new(0.0, 0.0), t(0)).unwrap();
        m.feed_motion(id, Point::new(40.0, 0.0), t(50)).unwrap();
        assert_eq!(m.tick(t(75)), 1);
        let mid = m.get(id).unwrap().position;
        assert!(mid.x > 0.0 && mid.x < 40.0);

        m.get_mut(id).unwrap().action = Action::Sitting;
        assert_eq!(m.tick(t(90)), 0);
        assert_eq!(m.get(id).unwrap().position, mid);
    }

    #[test]
    fn test_remove_disposes_smoother() {
        let mut m = mirror();
        let id = SessionId::new(2);
        m.spawn(id);
        assert!(m.remove(id).is_some());
        assert_eq!(m.smoother_count(), 0);
        assert!(m.remove(id).is_none());
        assert!(m.feed_motion(id, Point::ORIGIN, PresenceTime::ZERO).is_err());
    }
}
