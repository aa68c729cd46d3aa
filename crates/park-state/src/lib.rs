//! Cursor Park State - the replicated presence document
//!
//! This crate implements the document side of presence:
//! - Lamport stamps and version vectors
//! - Field-level last-writer-wins merge of avatar records
//! - Patch generation for every winning change
//! - Document handles with read-your-writes local application
//! - A repository trait and an in-memory relay standing in for the network

pub mod change;
pub mod document;
pub mod handle;
pub mod relay;
pub mod repo;
pub mod version;

pub use change::*;
pub use document::*;
pub use handle::*;
pub use relay::*;
pub use repo::*;
pub use version::*;
