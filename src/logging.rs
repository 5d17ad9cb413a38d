//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber writing to stderr.
///
/// The filter comes from `LOG_LEVEL`, then `RUST_LOG`, then `default_level`.
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init(default_level: &str) {
    let filter = filter_from_env(default_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn filter_from_env(default_level: &str) -> EnvFilter {
    ["LOG_LEVEL", "RUST_LOG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}
