//! Tracing setup
//!
//! The pipeline logs through `tracing`; the embedding application decides
//! where the events go. This helper wires a sensible default subscriber
//! (env-filter driven, `RUST_LOG` respected) for hosts that do not install
//! their own.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the default subscriber. Safe to call more than once; subsequent
/// calls are no-ops if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
