//! Cursor Park Motion - continuity for sparse remote samples
//!
//! Remote avatars publish their position only as often as the network allows.
//! This crate turns those samples into per-frame positions:
//! - [`CatmullRom`] spline through recent samples
//! - [`MotionSmoother`] that schedules spline segments and detects jumps
//! - [`KeyframeAnimation`] for scripted object motion (e.g. sliding)

pub mod keyframe;
pub mod smoother;
pub mod spline;

pub use keyframe::*;
pub use smoother::*;
pub use spline::*;
