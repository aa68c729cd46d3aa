//! Session identity
//!
//! A per-process stable id plus the default appearance picked once at
//! construction.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::SessionId;

/// Palette avatar colours are drawn from
pub const PALETTE: [&str; 6] = ["#447F59", "#A10314", "#FB546E", "#8750C9", "#E601B2", "#2962C5"];

/// Avatar scales drawn at session start
pub const SCALES: [f64; 7] = [1.7, 1.8, 1.9, 2.0, 2.1, 2.2, 2.3];

/// Identity of the local session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionIdentity {
    id: SessionId,
    color: String,
    scale: f64,
}

impl SessionIdentity {
    /// Generate a new random identity
    pub fn generate() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Deterministic identity for tests and simulations
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(&mut StdRng::seed_from_u64(seed))
    }

    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = SessionId::random(rng);
        let color = PALETTE.choose(rng).copied().unwrap_or(PALETTE[0]);
        let scale = SCALES.choose(rng).copied().unwrap_or(SCALES[0]);

        SessionIdentity {
            id,
            color: color.to_string(),
            scale,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}
