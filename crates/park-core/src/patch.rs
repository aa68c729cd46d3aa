//! Patch definitions
//!
//! A patch is one change notification produced by the replication backend
//! after a mutation is merged into a replica. The patch type is closed and
//! backend-independent: anything that can report record creation, field
//! writes and record deletion can drive the presence pipeline.

use crate::{FieldValue, SessionId};

/// A single document change notification
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    /// A record for a new avatar id appeared
    Create { avatar: SessionId },
    /// A field of an existing record took a new winning value
    Put { avatar: SessionId, value: FieldValue },
    /// A record was removed
    Delete { avatar: SessionId },
}

impl Patch {
    /// Avatar the patch is addressed to
    pub fn avatar(&self) -> SessionId {
        match self {
            Patch::Create { avatar } | Patch::Put { avatar, .. } | Patch::Delete { avatar } => {
                *avatar
            }
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Patch::Create { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Patch::Delete { .. })
    }
}
