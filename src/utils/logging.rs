//! Logging initialization
//!
//! Builds the global tracing subscriber for the binary. The default level is
//! INFO; `RUST_LOG` overrides it.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; the binary calls it before any other work.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
