//! Console logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "statement_reconciler=info";

/// Installs a console subscriber filtered by `RUST_LOG`, falling back to
/// info-level output for this crate.
///
/// Calling it twice is harmless, the second call leaves the first subscriber
/// in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}
