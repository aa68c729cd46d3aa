//! Presence document - the replicated map of avatar records
//!
//! Merge rule: per field, the change with the highest stamp wins. A record is
//! alive while its latest creation stamp is above its latest deletion stamp.
//! The merge is commutative and idempotent, so replicas that saw the same set
//! of changes hold identical snapshots whatever the arrival order.

use std::collections::BTreeMap;

use park_core::{AvatarField, AvatarRecord, FieldValue, Patch, SessionId};
use tracing::trace;

use crate::{Change, ChangeOp, ReplicaId, Stamp, VersionVector};

/// Winning write of one field
#[derive(Clone, Debug, PartialEq)]
struct FieldSlot {
    stamp: Stamp,
    value: FieldValue,
}

/// Merge state of one record
#[derive(Clone, Debug, Default, PartialEq)]
struct RecordSlot {
    created: Option<Stamp>,
    deleted: Option<Stamp>,
    fields: BTreeMap<AvatarField, FieldSlot>,
}

impl RecordSlot {
    fn alive(&self) -> bool {
        match (self.created, self.deleted) {
            (Some(c), Some(d)) => c > d,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Write a field if the stamp beats the current winner
    fn write(&mut self, stamp: Stamp, value: FieldValue) -> bool {
        let field = value.field();
        match self.fields.get(&field) {
            Some(slot) if slot.stamp >= stamp => false,
            _ => {
                self.fields.insert(field, FieldSlot { stamp, value });
                true
            }
        }
    }

    fn record(&self) -> Option<AvatarRecord> {
        if !self.alive() {
            return None;
        }
        AvatarRecord::from_fields(self.fields.values().map(|s| &s.value))
    }

    fn creation_patches(&self, avatar: SessionId) -> Vec<Patch> {
        let mut patches = vec![Patch::Create { avatar }];
        patches.extend(self.fields.values().map(|s| Patch::Put {
            avatar,
            value: s.value.clone(),
        }));
        patches
    }
}

/// The replicated presence document
#[derive(Debug, Default)]
pub struct PresenceDocument {
    records: BTreeMap<SessionId, RecordSlot>,
    version: VersionVector,
    max_counter: u64,
}

impl PresenceDocument {
    pub fn new() -> Self {
        PresenceDocument::default()
    }

    /// Next Lamport stamp for a local change by `replica`
    pub fn next_stamp(&mut self, replica: ReplicaId) -> Stamp {
        self.max_counter += 1;
        Stamp::new(self.max_counter, replica)
    }

    /// Merge one change, returning the patches it produced
    ///
    /// Changes already seen produce nothing.
    pub fn apply(&mut self, change: &Change) -> Vec<Patch> {
        if self.version.contains(change.stamp) {
            trace!(stamp = ?change.stamp, "skipping duplicate change");
            return Vec::new();
        }
        self.version.observe(change.stamp);
        self.max_counter = self.max_counter.max(change.stamp.counter);

        let stamp = change.stamp;
        let avatar = change.op.avatar();
        let slot = self.records.entry(avatar).or_default();
        let was_alive = slot.alive();
        let mut changed = Vec::new();

        match &change.op {
            ChangeOp::PutRecord { record, .. } => {
                if slot.created.map_or(true, |c| stamp > c) {
                    slot.created = Some(stamp);
                }
                for value in record.fields() {
                    let field = value.field();
                    if slot.write(stamp, value) {
                        changed.push(field);
                    }
                }
            }
            ChangeOp::PutField { value, .. } => {
                if slot.write(stamp, value.clone()) {
                    changed.push(value.field());
                }
            }
            ChangeOp::DeleteRecord { .. } => {
                if slot.deleted.map_or(true, |d| stamp > d) {
                    slot.deleted = Some(stamp);
                }
            }
        }

        match (was_alive, slot.alive()) {
            (false, true) => slot.creation_patches(avatar),
            (true, true) => changed
                .into_iter()
                .filter_map(|field| slot.fields.get(&field))
                .map(|s| Patch::Put {
                    avatar,
                    value: s.value.clone(),
                })
                .collect(),
            (true, false) => vec![Patch::Delete { avatar }],
            (false, false) => Vec::new(),
        }
    }

    /// Patches that rebuild the current state from scratch (hydration)
    pub fn hydration_patches(&self) -> Vec<Patch> {
        self.records
            .iter()
            .filter(|(_, slot)| slot.alive())
            .flat_map(|(id, slot)| slot.creation_patches(*id))
            .collect()
    }

    /// Get a live record
    pub fn get(&self, avatar: SessionId) -> Option<AvatarRecord> {
        self.records.get(&avatar).and_then(|s| s.record())
    }

    pub fn contains(&self, avatar: SessionId) -> bool {
        self.records.get(&avatar).map_or(false, |s| s.alive())
    }

    /// All live records
    pub fn snapshot(&self) -> BTreeMap<SessionId, AvatarRecord> {
        self.records
            .iter()
            .filter_map(|(id, slot)| slot.record().map(|r| (*id, r)))
            .collect()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.values().filter(|s| s.alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn version(&self) -> &VersionVector {
        &self.version
    }
}
