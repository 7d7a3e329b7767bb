// src/telemetry.rs
// =============================================================================
// Logging setup for the binary.
//
// Log lines go to stderr so `--json` output on stdout stays parseable.
// The level comes from RUST_LOG, e.g. RUST_LOG=async_google_search=debug
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
