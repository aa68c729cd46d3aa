//! Multi-session park simulator
//!
//! Every session shares one in-memory relay and one manual clock, so a test
//! decides exactly when changes propagate and how much time passes.

use std::collections::BTreeMap;
use std::sync::Arc;

use park_core::{DocumentAddress, ParkError, ParkResult, Point, Rect, SessionId, SessionIdentity};
use park_runtime::{
    Host, InputEvent, ObjectId, ObjectKind, ParkConfig, PresenceSession, SceneTree, SessionContext,
};
use park_state::{MemoryRelay, MemoryRepo};
use park_time::ManualClock;
use tracing::{debug, warn};

/// A simulated client
pub type SimSession = PresenceSession<MemoryRepo>;

/// Sync rounds after which [`ParkSimulator::settle`] gives up
pub const MAX_SETTLE_ROUNDS: usize = 32;

/// Many sessions over one relay
pub struct ParkSimulator {
    relay: MemoryRelay,
    clock: ManualClock,
    config: ParkConfig,
    /// Reference scene; every session builds the same one
    scene: SceneTree,
    sessions: Vec<SimSession>,
    seed_counter: u64,
}

impl ParkSimulator {
    pub fn new(config: ParkConfig) -> ParkResult<Self> {
        config.validate()?;
        Ok(ParkSimulator {
            relay: MemoryRelay::new(),
            clock: ManualClock::new(),
            scene: SceneTree::standard(config.root()),
            config,
            sessions: Vec::new(),
            seed_counter: 0,
        })
    }

    /// Simulator with the default configuration
    pub fn standard() -> Self {
        let config = ParkConfig::default();
        ParkSimulator {
            relay: MemoryRelay::new(),
            clock: ManualClock::new(),
            scene: SceneTree::standard(config.root()),
            config,
            sessions: Vec::new(),
            seed_counter: 0,
        }
    }

    /// Add a detached session; returns its index
    pub fn spawn(&mut self) -> ParkResult<usize> {
        let seed = self.seed_counter;
        self.seed_counter += 1;

        let ctx = SessionContext::new(
            SessionIdentity::seeded(seed),
            self.config.clone(),
            Arc::new(self.clock.clone()),
        )?;
        // Keep address/replica draws apart from the identity stream
        let repo = MemoryRepo::seeded(self.relay.clone(), seed ^ 0x5eed_0000_0000);
        let scene = SceneTree::standard(self.config.root());
        self.sessions.push(PresenceSession::new(ctx, repo, scene));
        Ok(self.sessions.len() - 1)
    }

    /// Spawn `count` sessions into one new document and let them settle
    pub fn populate(&mut self, count: usize) -> ParkResult<DocumentAddress> {
        let mut address: Option<DocumentAddress> = None;
        for _ in 0..count {
            let i = self.spawn()?;
            let joined = self.sessions[i].join(address.as_ref().map(DocumentAddress::as_str))?;
            address.get_or_insert(joined);
        }
        self.settle();
        address
            .ok_or_else(|| ParkError::InvalidConfig("populate needs at least one session".into()))
    }

    pub fn session(&self, i: usize) -> &SimSession {
        &self.sessions[i]
    }

    pub fn session_mut(&mut self, i: usize) -> &mut SimSession {
        &mut self.sessions[i]
    }

    pub fn sessions(&self) -> &[SimSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn relay(&self) -> &MemoryRelay {
        &self.relay
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn config(&self) -> &ParkConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn id(&self, i: usize) -> SessionId {
        self.sessions[i].id()
    }

    // ------------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------------

    pub fn input(&mut self, i: usize, event: InputEvent) {
        self.sessions[i].handle_input(event);
    }

    /// Object of `kind` with its bounds
    pub fn object(&self, kind: ObjectKind) -> Option<(ObjectId, Rect)> {
        let id = self.scene.find(kind)?;
        self.scene.object(id).map(|o| (id, o.rect))
    }

    /// Point `dx` pixels into the object, vertically centred
    pub fn object_point(&self, kind: ObjectKind, dx: f64) -> Option<Point> {
        self.object(kind)
            .map(|(_, r)| Point::new(r.x + dx, r.y + r.height / 2.0))
    }

    /// Click `dx` pixels into the first object of `kind`
    pub fn click_object(&mut self, i: usize, kind: ObjectKind, dx: f64) -> Option<ObjectId> {
        let (id, _) = self.object(kind)?;
        let point = self.object_point(kind, dx)?;
        self.input(i, InputEvent::Click(point));
        Some(id)
    }

    /// One sync per attached session; returns patches applied
    pub fn sync_all(&mut self) -> usize {
        let mut applied = 0;
        for session in self.sessions.iter_mut().filter(|s| s.is_attached()) {
            match session.sync() {
                Ok(n) => applied += n,
                Err(e) => warn!(avatar = %session.id(), error = %e, "simulated sync failed"),
            }
        }
        applied
    }

    /// Sync until no session has pending writes and nothing new arrives
    ///
    /// Returns the rounds used.
    pub fn settle(&mut self) -> usize {
        for round in 1..=MAX_SETTLE_ROUNDS {
            let pending = self.pending();
            let applied = self.sync_all();
            if pending == 0 && applied == 0 {
                return round;
            }
        }
        warn!(rounds = MAX_SETTLE_ROUNDS, "simulation did not settle");
        MAX_SETTLE_ROUNDS
    }

    /// Local writes not yet pushed, over all sessions
    pub fn pending(&self) -> usize {
        self.sessions
            .iter()
            .filter_map(|s| s.handle())
            .map(|h| h.pending())
            .sum()
    }

    /// Advance the clock and run one frame everywhere; returns views moved
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance_millis(ms);
        self.sessions.iter_mut().map(|s| s.tick()).sum()
    }

    /// Run `frames` frames of `frame_ms` each
    pub fn run_frames(&mut self, frames: usize, frame_ms: u64) -> usize {
        (0..frames).map(|_| self.advance(frame_ms)).sum()
    }

    // ------------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------------

    /// Host of every mirrored avatar, as seen by session `i`
    pub fn hosts(&self, i: usize) -> BTreeMap<SessionId, Host> {
        self.sessions[i]
            .mirror()
            .views()
            .map(|v| (v.id, v.host))
            .collect()
    }

    /// No object hosts two avatars, and every broker agrees with the mirror
    pub fn exclusive(&self) -> bool {
        self.sessions.iter().all(|s| {
            s.scene().objects().all(|o| {
                let hosted = s.mirror().hosted_by(Host::Object(o.id));
                let occupant = s.brokers().occupant(o.id);
                let ok = hosted.len() <= 1 && occupant == hosted.first().copied();
                if !ok {
                    debug!(
                        avatar = %s.id(),
                        object = ?o.id,
                        ?hosted,
                        ?occupant,
                        "exclusion violated"
                    );
                }
                ok
            })
        })
    }

    /// Every attached session holds the same records and hosts
    pub fn converged(&self) -> bool {
        let attached: Vec<usize> = (0..self.sessions.len())
            .filter(|i| self.sessions[*i].is_attached())
            .collect();
        let Some((&first, rest)) = attached.split_first() else {
            return true;
        };
        let snapshot = |i: usize| self.sessions[i].handle().map(|h| h.document().snapshot());
        let reference = (snapshot(first), self.hosts(first));
        rest.iter()
            .all(|&i| (snapshot(i), self.hosts(i)) == reference)
    }
}
