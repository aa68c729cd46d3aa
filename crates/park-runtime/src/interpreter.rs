//! Patch interpreter - document patches into view and occupancy changes
//!
//! Rules, per patch:
//! - `Create` of an unknown avatar spawns a root-hosted view.
//! - `Put(parent)` relocates the view when the locator resolves to a new
//!   host. The old host object vacates it, the new one records it. Unresolved
//!   locators leave the view where it is (deferred).
//! - `Put(x|y)` of a remote pointing avatar becomes a smoothed sample. The x
//!   and y writes of one batch form a single sample.
//! - Any other `Put` is applied directly. Leaving the pointing pose
//!   interrupts smoothing.
//! - `Delete` removes the view, disposes its smoother and vacates its host.
//!
//! Patches for avatars without a view are skipped; the rest of the batch
//! still applies.

use park_core::{Action, FieldValue, Locator, Patch, Point, PresenceTime, SessionId};
use tracing::{debug, trace};

use crate::{AvatarView, BrokerTable, Host, ObjectId, PresenceMirror, SceneTree, SessionStats};

/// Outcome of one batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interpretation {
    pub applied: usize,
    pub skipped: usize,
    /// Parent locators that did not resolve
    pub deferred: Vec<(SessionId, Locator)>,
    /// Objects a remote avatar took from the local avatar
    pub preempted: Vec<ObjectId>,
}

/// Applies patch batches to a mirror
pub struct PatchInterpreter<'a> {
    mirror: &'a mut PresenceMirror,
    scene: &'a SceneTree,
    brokers: &'a mut BrokerTable,
    stats: &'a mut SessionStats,
}

impl<'a> PatchInterpreter<'a> {
    pub fn new(
        mirror: &'a mut PresenceMirror,
        scene: &'a SceneTree,
        brokers: &'a mut BrokerTable,
        stats: &'a mut SessionStats,
    ) -> Self {
        PatchInterpreter {
            mirror,
            scene,
            brokers,
            stats,
        }
    }

    pub fn apply_batch(&mut self, patches: &[Patch], now: PresenceTime) -> Interpretation {
        let mut out = Interpretation::default();
        // Avatars with a pending position sample, in first-touch order
        let mut samples: Vec<SessionId> = Vec::new();

        for patch in patches {
            let avatar = patch.avatar();
            let applied = match patch {
                Patch::Create { .. } => {
                    self.mirror.spawn(avatar);
                    true
                }
                Patch::Put { value, .. } => self.put(avatar, value, &mut samples, &mut out),
                Patch::Delete { .. } => {
                    samples.retain(|id| *id != avatar);
                    self.delete(avatar)
                }
            };
            if applied {
                out.applied += 1;
            } else {
                trace!(avatar = ?avatar, "skipping patch for unknown avatar");
                out.skipped += 1;
            }
        }

        for avatar in samples {
            self.flush_sample(avatar, now);
        }

        self.stats.patches_applied += out.applied as u64;
        out
    }

    fn put(
        &mut self,
        avatar: SessionId,
        value: &FieldValue,
        samples: &mut Vec<SessionId>,
        out: &mut Interpretation,
    ) -> bool {
        let Some(view) = self.mirror.get_mut(avatar) else {
            return false;
        };

        match value {
            FieldValue::Parent(locator) => {
                self.reparent(avatar, locator, out);
            }
            FieldValue::X(x) => {
                view.target.x = *x;
                Self::defer_sample(view, samples);
            }
            FieldValue::Y(y) => {
                view.target.y = *y;
                Self::defer_sample(view, samples);
            }
            FieldValue::Action(action) => {
                let was_pointing = view.action == Action::Pointing;
                view.action = *action;
                if was_pointing && *action != Action::Pointing {
                    self.mirror.interrupt_motion(avatar);
                }
            }
            FieldValue::Color(color) => view.color = color.clone(),
            FieldValue::Rotation(rotation) => view.rotation = *rotation,
            FieldValue::Scale(scale) => view.scale = *scale,
        }
        true
    }

    /// Queue a smoothed sample, or place directly when smoothing does not apply
    fn defer_sample(view: &mut AvatarView, samples: &mut Vec<SessionId>) {
        if !view.is_self && view.action == Action::Pointing {
            if !samples.contains(&view.id) {
                samples.push(view.id);
            }
        } else {
            view.position = view.target;
        }
    }

    fn flush_sample(&mut self, avatar: SessionId, now: PresenceTime) {
        let Some(view) = self.mirror.get_mut(avatar) else {
            return;
        };
        if view.is_self || view.action != Action::Pointing {
            view.position = view.target;
            return;
        }
        let target = view.target;
        if self.mirror.feed_motion(avatar, target, now).is_ok() {
            self.stats.smoothed_samples += 1;
        }
    }

    fn reparent(&mut self, avatar: SessionId, locator: &Locator, out: &mut Interpretation) {
        if locator.is_empty() {
            return;
        }
        let Some(host) = self.scene.resolve(locator) else {
            debug!(avatar = ?avatar, locator = %locator, "parent not in scene, deferring");
            self.stats.deferred_parents += 1;
            out.deferred.push((avatar, locator.clone()));
            return;
        };

        let previous = match self.mirror.relocate(avatar, host) {
            Ok(Some(previous)) => previous,
            _ => return,
        };

        if let Some(old) = previous.object() {
            self.brokers.vacate(old, avatar);
        }

        if let Some(object) = host.object() {
            let local = self.mirror.local_id();
            if let Some(displaced) = self.brokers.record_occupant(object, avatar) {
                if displaced == local && avatar != local {
                    debug!(object = ?object, by = ?avatar, "local avatar preempted");
                    out.preempted.push(object);
                }
            }
        }
    }

    fn delete(&mut self, avatar: SessionId) -> bool {
        let Some(view) = self.mirror.remove(avatar) else {
            return false;
        };
        if let Some(object) = view.host.object() {
            self.brokers.vacate(object, avatar);
        }
        true
    }
}

/// Rendered position of `avatar` in page coordinates
///
/// Object-hosted views store host-relative offsets; this adds the host origin.
pub fn page_position(
    scene: &SceneTree,
    mirror: &PresenceMirror,
    avatar: SessionId,
) -> Option<Point> {
    let view = mirror.get(avatar)?;
    match view.host {
        Host::Root => Some(view.position),
        Host::Object(id) => {
            let rect = scene.object(id)?.rect;
            Some(Point::new(rect.x + view.position.x, rect.y + view.position.y))
        }
    }
}
