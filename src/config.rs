//! Service location and logging setup.

use anyhow::Result;
use reqwest::Url;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the service base URL.
pub const SERVER_URL_ENV: &str = "FREDHUTCH_BATCH_WRAPPER_SERVER_URL";

pub const DEFAULT_SERVER_URL: &str = "https://batch-dashboard.fhcrc.org";

/// Join the service base URL and an operation path with a single `/`.
pub fn endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Install the stderr log subscriber.
///
/// `--debug` wins over `RUST_LOG`; with neither, only warnings and errors are shown.
pub fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
