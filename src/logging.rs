use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr so stdout carries only tool output.
///
/// `RUST_LOG` wins over `default_filter`; `verbose` forces debug level.
pub fn init_logging(default_filter: &str, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
