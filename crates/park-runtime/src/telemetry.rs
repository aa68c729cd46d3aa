//! Tracing setup

use park_core::{ParkError, ParkResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> ParkResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.map_err(|e| ParkError::InvalidConfig(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("debug", LogFormat::Compact);
        assert!(init_tracing("debug", LogFormat::Json).is_err());
    }
}
