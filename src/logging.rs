//! Tracing subscriber setup for the `lineage` binary.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber writing to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
