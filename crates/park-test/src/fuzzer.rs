//! Churn fuzzer
//!
//! Random pointer moves, clicks, key presses, frames and syncs across many
//! sessions, in random interleavings. Once the simulation settles, ownership
//! must be exclusive and every replica must agree.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use park_core::{ParkResult, Point};
use park_runtime::{InputEvent, Key, ObjectKind};

use crate::ParkSimulator;

const KEYS: [Key; 5] = [Key::ArrowLeft, Key::ArrowRight, Key::ArrowUp, Key::ArrowDown, Key::Space];

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    pub sessions: usize,
    pub steps: usize,
    /// Chance that a step is a sync instead of input
    pub sync_probability: f64,
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            sessions: 4,
            steps: 200,
            sync_probability: 0.3,
            seed: 0x7061726b,
        }
    }
}

impl FuzzerConfig {
    pub fn light() -> Self {
        Self {
            sessions: 2,
            steps: 50,
            ..Default::default()
        }
    }

    pub fn stress() -> Self {
        Self {
            sessions: 6,
            steps: 1_000,
            sync_probability: 0.15,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub steps: usize,
    pub clicks: usize,
    pub keys: usize,
    pub syncs: usize,
    pub preemptions: u64,
    pub settle_rounds: usize,
    pub exclusive: bool,
    pub converged: bool,
}

impl FuzzResult {
    pub fn passed(&self) -> bool {
        self.exclusive && self.converged
    }
}

pub struct PresenceFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
    sim: ParkSimulator,
}

impl PresenceFuzzer {
    pub fn new(config: FuzzerConfig) -> ParkResult<Self> {
        let mut sim = ParkSimulator::standard();
        sim.populate(config.sessions.max(1))?;
        Ok(PresenceFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            sim,
        })
    }

    pub fn simulator(&self) -> &ParkSimulator {
        &self.sim
    }

    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();
        let n = self.sim.len();

        for _ in 0..self.config.steps {
            result.steps += 1;
            let i = self.rng.gen_range(0..n);

            if self.rng.gen_bool(self.config.sync_probability) {
                if self.sim.session_mut(i).sync().is_ok() {
                    result.syncs += 1;
                }
                continue;
            }

            match self.rng.gen_range(0..6) {
                0 => {
                    let p = self.random_point();
                    self.sim.input(i, InputEvent::PointerMove(p));
                }
                1 | 2 => {
                    let kind = ObjectKind::ALL[self.rng.gen_range(0..ObjectKind::ALL.len())];
                    let width = self.sim.object(kind).map_or(1.0, |(_, r)| r.width);
                    let dx = self.rng.gen_range(0.0..width);
                    self.sim.click_object(i, kind, dx);
                    result.clicks += 1;
                }
                3 => {
                    let p = self.random_point();
                    self.sim.input(i, InputEvent::Click(p));
                    result.clicks += 1;
                }
                4 => {
                    let key = KEYS[self.rng.gen_range(0..KEYS.len())];
                    self.sim.input(i, InputEvent::KeyDown(key));
                    if self.rng.gen_bool(0.7) {
                        self.sim.input(i, InputEvent::KeyUp(key));
                    }
                    result.keys += 1;
                }
                _ => {
                    let ms = self.rng.gen_range(1..40);
                    self.sim.advance(ms);
                }
            }
        }

        result.settle_rounds = self.sim.settle();
        // Let descents finish, then propagate their last frames
        let frames = (self.sim.config().slide_duration_ms / 16 + 2) as usize;
        self.sim.run_frames(frames, 16);
        result.settle_rounds += self.sim.settle();

        result.preemptions = self
            .sim
            .sessions()
            .iter()
            .map(|s| s.stats().preemptions)
            .sum();
        result.exclusive = self.sim.exclusive();
        result.converged = self.sim.converged();
        result
    }

    fn random_point(&mut self) -> Point {
        Point::new(self.rng.gen_range(0.0..720.0), self.rng.gen_range(300.0..480.0))
    }
}
