//! In-memory relay - stand-in for the network merge service
//!
//! The relay keeps one append-only change log per document address and hands
//! out log suffixes. Every session of a simulation shares one relay; it can be
//! taken offline to exercise failure paths.

use std::collections::HashMap;
use std::sync::Arc;

use park_core::{DocumentAddress, ParkError, ParkResult};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::{Change, DocHandle, DocumentRepo, ReplicaId, SyncChannel};

#[derive(Debug)]
struct RelayState {
    logs: HashMap<DocumentAddress, Vec<Change>>,
    online: bool,
}

/// Shared in-memory relay
#[derive(Clone, Debug)]
pub struct MemoryRelay {
    state: Arc<Mutex<RelayState>>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        MemoryRelay {
            state: Arc::new(Mutex::new(RelayState {
                logs: HashMap::new(),
                online: true,
            })),
        }
    }

    /// Take the relay on- or offline
    pub fn set_online(&self, online: bool) {
        self.state.lock().online = online;
    }

    pub fn is_online(&self) -> bool {
        self.state.lock().online
    }

    /// Register an empty document log
    pub fn open(&self, address: &DocumentAddress) {
        self.state.lock().logs.entry(address.clone()).or_default();
    }

    pub fn contains(&self, address: &DocumentAddress) -> bool {
        self.state.lock().logs.contains_key(address)
    }

    /// Length of a document's shared log
    pub fn log_len(&self, address: &DocumentAddress) -> usize {
        self.state.lock().logs.get(address).map_or(0, |l| l.len())
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().logs.len()
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncChannel for MemoryRelay {
    fn push(&self, address: &DocumentAddress, changes: &[Change]) -> ParkResult<()> {
        let mut state = self.state.lock();
        if !state.online {
            return Err(ParkError::RelayUnavailable);
        }
        state
            .logs
            .entry(address.clone())
            .or_default()
            .extend_from_slice(changes);
        Ok(())
    }

    fn pull(&self, address: &DocumentAddress, from: usize) -> ParkResult<Vec<Change>> {
        let state = self.state.lock();
        if !state.online {
            return Err(ParkError::RelayUnavailable);
        }
        let log = state
            .logs
            .get(address)
            .ok_or_else(|| ParkError::DocumentNotFound(address.clone()))?;
        Ok(log.get(from..).map(|s| s.to_vec()).unwrap_or_default())
    }
}

/// Repository of documents hosted on a [`MemoryRelay`]
pub struct MemoryRepo {
    relay: MemoryRelay,
    rng: StdRng,
}

impl MemoryRepo {
    pub fn new(relay: MemoryRelay) -> Self {
        MemoryRepo {
            relay,
            rng: StdRng::from_entropy(),
        }
    }

    /// Repository with deterministic addresses and replica ids
    pub fn seeded(relay: MemoryRelay, seed: u64) -> Self {
        MemoryRepo {
            relay,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn relay(&self) -> &MemoryRelay {
        &self.relay
    }

    fn handle(&mut self, address: DocumentAddress) -> DocHandle {
        let replica = ReplicaId::random(&mut self.rng);
        let channel: Arc<dyn SyncChannel> = Arc::new(self.relay.clone());
        DocHandle::new(address, replica, Some(channel))
    }
}

impl DocumentRepo for MemoryRepo {
    fn create(&mut self) -> ParkResult<DocHandle> {
        let address = DocumentAddress::generate(&mut self.rng);
        // Offline creation still succeeds; the log appears on the first push.
        if self.relay.is_online() {
            self.relay.open(&address);
        }
        info!(address = %address, "created presence document");
        Ok(self.handle(address))
    }

    fn find(&mut self, address: &DocumentAddress) -> ParkResult<DocHandle> {
        if !self.relay.is_online() {
            return Err(ParkError::RelayUnavailable);
        }
        if !self.relay.contains(address) {
            return Err(ParkError::DocumentNotFound(address.clone()));
        }
        let mut handle = self.handle(address.clone());
        handle.sync()?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::{AvatarRecord, AvatarUpdate, Locator, Point, SessionId};

    fn record() -> AvatarRecord {
        AvatarRecord::joining("#A10314", 1.8, Point::ORIGIN, Locator::new("cursor-park"))
    }

    #[test]
    fn test_find_unknown_document() {
        let mut repo = MemoryRepo::seeded(MemoryRelay::new(), 1);
        let addr = DocumentAddress::parse("park:0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(repo.find(&addr).err(), Some(ParkError::DocumentNotFound(addr)));
    }

    #[test]
    fn test_two_handles_converge() {
        let relay = MemoryRelay::new();
        let mut repo_a = MemoryRepo::seeded(relay.clone(), 1);
        let mut repo_b = MemoryRepo::seeded(relay.clone(), 2);

        let mut a = repo_a.create().unwrap();
        let id_a = SessionId::new(1);
        a.change(|tx| tx.put_record(id_a, record()));
        a.sync().unwrap();

        let mut b = repo_b.find(a.address()).unwrap();
        assert!(b.document().contains(id_a));

        let id_b = SessionId::new(2);
        b.change(|tx| tx.put_record(id_b, record()));
        b.change(|tx| tx.update(id_b, &AvatarUpdate::new().x(9.0)));
        b.sync().unwrap();

        let patches = a.sync().unwrap();
        assert_eq!(patches.iter().filter(|p| p.is_create()).count(), 1);
        assert_eq!(a.document().snapshot(), b.document().snapshot());
        assert_eq!(relay.log_len(a.address()), 3);
    }

    #[test]
    fn test_offline_relay() {
        let relay = MemoryRelay::new();
        let mut repo = MemoryRepo::seeded(relay.clone(), 1);
        let mut a = repo.create().unwrap();
        let addr = a.address().clone();

        relay.set_online(false);
        a.change(|tx| tx.put_record(SessionId::new(1), record()));
        assert_eq!(a.sync().err(), Some(ParkError::RelayUnavailable));
        assert_eq!(a.pending(), 1);
        assert!(repo.find(&addr).is_err());

        relay.set_online(true);
        assert!(a.sync().is_ok());
        assert_eq!(a.pending(), 0);
        assert_eq!(relay.log_len(&addr), 1);
    }
}
