//! Document repository - creation and lookup of presence documents

use park_core::{DocumentAddress, ParkResult};

use crate::DocHandle;

/// Source of document handles
///
/// Implementations connect handles to a causally consistent merge service.
pub trait DocumentRepo {
    /// Create a brand-new, empty document
    fn create(&mut self) -> ParkResult<DocHandle>;

    /// Attach to an existing document, loaded with every change known so far
    fn find(&mut self, address: &DocumentAddress) -> ParkResult<DocHandle>;
}
