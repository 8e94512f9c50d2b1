//! Logging setup for native binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "geopay=info,geopay_core=info";

/// Install the global subscriber; logs go to stderr so stdout stays clean for JSON
pub fn init(verbose: bool) {
    let default = if verbose {
        "geopay=debug,geopay_core=debug"
    } else {
        DEFAULT_LOG_FILTER
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
