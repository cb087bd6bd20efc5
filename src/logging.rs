//! Tracing setup for the CLI and the API server.
//!
//! Filtering follows `RUST_LOG`, defaulting to `info`.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the human-readable subscriber. Later calls are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .init();

        info!("card-checker tracing initialized");
    });
}

/// Install a JSON subscriber for log shipping. Later calls are ignored.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer)
            .init();

        info!("card-checker tracing initialized (JSON mode)");
    });
}
