//! Cursor Park Time - clocks
//!
//! Every time-dependent component takes its time from a [`Clock`] so the same
//! code runs against the OS monotonic clock in production and against a
//! manually advanced clock in simulations.

pub mod clock;

pub use clock::*;
