//! Document handle - one replica of a presence document
//!
//! Local changes are applied to the replica immediately (read-your-writes)
//! and queued in an outbox; `sync` exchanges them with the relay.

use std::sync::Arc;

use park_core::{AvatarRecord, AvatarUpdate, DocumentAddress, ParkResult, Patch, SessionId};
use tracing::{debug, warn};

use crate::{Change, ChangeOp, PresenceDocument, ReplicaId};

/// Persistent connection to the merge service
pub trait SyncChannel: Send + Sync {
    /// Append local changes to the document's shared log
    fn push(&self, address: &DocumentAddress, changes: &[Change]) -> ParkResult<()>;

    /// Fetch the shared log from position `from` onwards
    fn pull(&self, address: &DocumentAddress, from: usize) -> ParkResult<Vec<Change>>;
}

/// Batch of operations built inside [`DocHandle::change`]
pub struct Transaction<'a> {
    document: &'a PresenceDocument,
    ops: Vec<ChangeOp>,
}

impl<'a> Transaction<'a> {
    /// Read a live record (state before this transaction)
    pub fn record(&self, avatar: SessionId) -> Option<AvatarRecord> {
        self.document.get(avatar)
    }

    pub fn put_record(&mut self, avatar: SessionId, record: AvatarRecord) {
        self.ops.push(ChangeOp::PutRecord { avatar, record });
    }

    /// Queue one field write per set field of `update`
    pub fn update(&mut self, avatar: SessionId, update: &AvatarUpdate) {
        for value in update.values() {
            self.ops.push(ChangeOp::PutField { avatar, value });
        }
    }

    pub fn delete_record(&mut self, avatar: SessionId) {
        self.ops.push(ChangeOp::DeleteRecord { avatar });
    }
}

/// Handle on one replica of a presence document
pub struct DocHandle {
    address: DocumentAddress,
    replica: ReplicaId,
    document: PresenceDocument,
    /// Local changes not yet pushed
    outbox: Vec<Change>,
    /// Position in the shared log already pulled
    cursor: usize,
    channel: Option<Arc<dyn SyncChannel>>,
}

impl DocHandle {
    pub fn new(
        address: DocumentAddress,
        replica: ReplicaId,
        channel: Option<Arc<dyn SyncChannel>>,
    ) -> Self {
        DocHandle {
            address,
            replica,
            document: PresenceDocument::new(),
            outbox: Vec::new(),
            cursor: 0,
            channel,
        }
    }

    pub fn address(&self) -> &DocumentAddress {
        &self.address
    }

    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    pub fn document(&self) -> &PresenceDocument {
        &self.document
    }

    /// Number of local changes waiting to be pushed
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Apply a batch of local operations, returning the resulting patches
    pub fn change<F>(&mut self, build: F) -> Vec<Patch>
    where
        F: FnOnce(&mut Transaction<'_>),
    {
        let ops = {
            let mut tx = Transaction {
                document: &self.document,
                ops: Vec::new(),
            };
            build(&mut tx);
            tx.ops
        };

        let mut patches = Vec::new();
        for op in ops {
            let change = Change::new(self.document.next_stamp(self.replica), op);
            patches.extend(self.document.apply(&change));
            self.outbox.push(change);
        }
        patches
    }

    /// Push pending local changes without pulling
    pub fn flush(&mut self) -> ParkResult<()> {
        let Some(channel) = &self.channel else {
            return Ok(());
        };
        if self.outbox.is_empty() {
            return Ok(());
        }
        channel.push(&self.address, &self.outbox)?;
        debug!(address = %self.address, pushed = self.outbox.len(), "flushed changes");
        self.outbox.clear();
        Ok(())
    }

    /// Exchange changes with the relay, returning patches for remote changes
    pub fn sync(&mut self) -> ParkResult<Vec<Patch>> {
        let Some(channel) = self.channel.clone() else {
            return Ok(Vec::new());
        };

        self.flush()?;

        let incoming = channel.pull(&self.address, self.cursor)?;
        self.cursor += incoming.len();

        let mut patches = Vec::new();
        for change in &incoming {
            patches.extend(self.document.apply(change));
        }
        if !patches.is_empty() {
            debug!(address = %self.address, patches = patches.len(), "merged remote changes");
        }
        Ok(patches)
    }
}

impl Drop for DocHandle {
    fn drop(&mut self) {
        if self.channel.is_some() && !self.outbox.is_empty() {
            warn!(
                address = %self.address,
                lost = self.outbox.len(),
                "dropping handle with unsent changes"
            );
        }
    }
}
