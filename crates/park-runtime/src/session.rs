//! Session context - identity, configuration and clock of one session
//!
//! Passed explicitly to the session instead of living in process globals, so
//! several sessions can share one process (and one simulation).

use std::sync::Arc;

use park_core::{ParkResult, PresenceTime, SessionId, SessionIdentity};
use park_time::{Clock, SystemClock};

use crate::ParkConfig;

#[derive(Clone)]
pub struct SessionContext {
    identity: SessionIdentity,
    config: ParkConfig,
    clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Context with a validated config
    pub fn new(
        identity: SessionIdentity,
        config: ParkConfig,
        clock: Arc<dyn Clock>,
    ) -> ParkResult<Self> {
        config.validate()?;
        Ok(SessionContext {
            identity,
            config,
            clock,
        })
    }

    /// Random identity, default config, system clock
    pub fn with_defaults() -> Self {
        SessionContext {
            identity: SessionIdentity::generate(),
            config: ParkConfig::default(),
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.identity.id()
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn config(&self) -> &ParkConfig {
        &self.config
    }

    pub fn now(&self) -> PresenceTime {
        self.clock.now()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
