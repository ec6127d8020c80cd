//! Diagnostic tracing for the `forge` binary.
//!
//! Payloads go to stdout; everything logged here goes to stderr, so piping
//! `forge generate` output stays clean regardless of `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Compact format on stderr.
///
/// ```bash
/// RUST_LOG=forge::core::synth=debug forge generate string ab
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
