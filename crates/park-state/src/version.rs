//! Replica identity, Lamport stamps and version vectors

use std::collections::HashMap;
use std::fmt;

use rand::Rng;

/// Replica identity - one per document handle
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReplicaId(pub u64);

impl ReplicaId {
    #[inline]
    pub fn new(id: u64) -> Self {
        ReplicaId(id)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ReplicaId(rng.gen())
    }
}

impl fmt::Debug for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Replica({:016x})", self.0)
    }
}

/// Lamport stamp carried by every change
///
/// Stamps are totally ordered by `(counter, replica)`; the highest stamp wins
/// a field.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Stamp {
    pub counter: u64,
    pub replica: ReplicaId,
}

impl Stamp {
    pub fn new(counter: u64, replica: ReplicaId) -> Self {
        Stamp { counter, replica }
    }
}

/// Version vector for causal bookkeeping (not total ordering)
///
/// Tracks the highest counter seen from each replica. Changes of one replica
/// are delivered in order, so a stamp at or below the entry has been seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionVector {
    clocks: HashMap<ReplicaId, u64>,
}

impl VersionVector {
    pub fn new() -> Self {
        VersionVector {
            clocks: HashMap::new(),
        }
    }

    /// Get the clock value for a replica
    #[inline]
    pub fn get(&self, replica: ReplicaId) -> u64 {
        self.clocks.get(&replica).copied().unwrap_or(0)
    }

    /// Record a stamp as seen
    pub fn observe(&mut self, stamp: Stamp) {
        let entry = self.clocks.entry(stamp.replica).or_insert(0);
        *entry = (*entry).max(stamp.counter);
    }

    /// Has this stamp already been seen?
    #[inline]
    pub fn contains(&self, stamp: Stamp) -> bool {
        stamp.counter <= self.get(stamp.replica)
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}
