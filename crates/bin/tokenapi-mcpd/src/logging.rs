//! Tracing setup for the daemon.
//!
//! Logs go to stderr. `RUST_LOG` overrides the level picked from `VERBOSE`.

use std::error::Error;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: JSON lines unless `pretty` is set.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(pretty: bool, verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    if pretty {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

const fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}
