//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; binaries call [`init_tracing`]
//! once at startup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `filter`.
///
/// `RUST_LOG` takes precedence over `filter` when set. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .with_target(false)
        .try_init()
        .is_ok()
}

fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
}
