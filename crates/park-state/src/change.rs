//! Change definitions
//!
//! A change is one stamped mutation of the presence document. Changes are
//! what replicas exchange; patches are what they report after merging.

use park_core::{AvatarRecord, FieldValue, SessionId};

use crate::Stamp;

/// Mutation operation on the presence document
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeOp {
    /// Create (or re-create) a whole record
    PutRecord {
        avatar: SessionId,
        record: AvatarRecord,
    },
    /// Write one field of a record
    PutField { avatar: SessionId, value: FieldValue },
    /// Remove a record
    DeleteRecord { avatar: SessionId },
}

impl ChangeOp {
    pub fn avatar(&self) -> SessionId {
        match self {
            ChangeOp::PutRecord { avatar, .. }
            | ChangeOp::PutField { avatar, .. }
            | ChangeOp::DeleteRecord { avatar } => *avatar,
        }
    }
}

/// A stamped change
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub stamp: Stamp,
    pub op: ChangeOp,
}

impl Change {
    pub fn new(stamp: Stamp, op: ChangeOp) -> Self {
        Change { stamp, op }
    }
}
