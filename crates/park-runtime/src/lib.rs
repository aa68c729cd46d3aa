//! Cursor Park Runtime - the presence session
//!
//! A session mirrors the replicated presence document into local avatar views
//! and arbitrates which interactive object owns the local avatar:
//! 1. Route input (pointer, clicks, keys) through listener subscriptions
//! 2. Publish local avatar changes (read-your-writes)
//! 3. Exchange changes with the relay
//! 4. Interpret remote patches into view updates and occupancy changes
//! 5. Drive motion smoothing and object animations once per frame

pub mod broker;
pub mod config;
pub mod input;
pub mod interpreter;
pub mod lifecycle;
pub mod mirror;
pub mod objects;
pub mod scene;
pub mod session;
pub mod stats;
pub mod subscription;
pub mod telemetry;

pub use broker::*;
pub use config::*;
pub use input::*;
pub use interpreter::*;
pub use lifecycle::*;
pub use mirror::*;
pub use objects::*;
pub use scene::*;
pub use session::*;
pub use stats::*;
pub use subscription::*;
pub use telemetry::*;
