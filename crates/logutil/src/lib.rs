//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output format for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    HumanReadable,
    /// Newline-delimited json.
    Json,
}

/// Configure the global logger, writing to stderr.
///
/// `RUST_LOG` takes precedence over the provided level when set.
pub fn configure_global_logger(default_level: Level, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::HumanReadable => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Initialize logging for tests.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
