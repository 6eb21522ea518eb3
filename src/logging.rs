//! Diagnostic tracing for the `taskgate` binary.
//!
//! Session reports go to stdout; tracing output goes to stderr and is
//! filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber: compact format on stderr.
///
/// `verbose` raises the default filter to `info` for this crate.
///
/// # Example
/// ```bash
/// RUST_LOG=taskgate=debug taskgate run-session --dry-run
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,taskgate=info"
    } else {
        DEFAULT_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
