//! Cursor Park Test Harness - multi-session simulation and protocol validation
//!
//! This crate provides:
//! - A simulator running many sessions over one relay and one manual clock
//! - End-to-end scenarios (join, handoff, leave, smoothing)
//! - Churn fuzzing of ownership under random input and sync orders

pub mod fuzzer;
pub mod integration;
pub mod simulator;

pub use fuzzer::*;
pub use integration::*;
pub use simulator::*;
