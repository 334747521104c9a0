//! Tracing setup helper for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Initialize a tracing subscriber from `RUST_LOG` (default `info`).
///
/// Idempotent: a second call is a no-op, so tests can call it freely.
pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
