//! Diagnostic logging.
//!
//! Stdout carries the tick protocol, so every log line goes to stderr.
//! Verbosity follows `RUST_LOG` and defaults to `warn`, e.g.
//! `RUST_LOG=armada=debug armada --config bot.toml`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
