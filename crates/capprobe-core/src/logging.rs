//! Tracing subscriber setup for hosts embedding a capability context.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,capprobe=debug";

/// Initialize a tracing subscriber for logging.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let _ = init_tracing();
        assert!(!init_tracing());
    }
}
