//! Tracing subscriber setup. Diagnostics go to stderr so command output on
//! stdout stays clean.

use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. `level` is either a bare level ("debug")
/// or a full directive string ("info,swarmtreasury::domain=trace"). An
/// unparseable filter falls back to `info`.
pub fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::from_str(level.trim()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let installed = if json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(false);
        subscriber.with(layer).try_init()
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();
        subscriber.with(layer).try_init()
    };

    if installed.is_ok() {
        tracing::debug!(level, format = if json { "json" } else { "compact" }, "logging initialized");
    }
}
