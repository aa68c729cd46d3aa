//! Cursor Park Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every layer of the park:
//! - Identifiers (SessionId, DocumentAddress, Locator)
//! - Time primitive (PresenceTime)
//! - Avatar records, partial updates and patches
//! - Geometry helpers
//! - Session identity (default appearance)

pub mod action;
pub mod error;
pub mod geometry;
pub mod id;
pub mod identity;
pub mod patch;
pub mod record;
pub mod time;

pub use action::*;
pub use error::*;
pub use geometry::*;
pub use id::*;
pub use identity::*;
pub use patch::*;
pub use record::*;
pub use time::*;
