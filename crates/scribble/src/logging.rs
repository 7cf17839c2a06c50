//! Log output for the server binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global `tracing` subscriber.
///
/// Verbosity comes from `RUST_LOG` (e.g. `RUST_LOG=scribble_room=debug`),
/// falling back to [`DEFAULT_FILTER`]. Calling it again is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
