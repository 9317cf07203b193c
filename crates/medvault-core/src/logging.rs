//! tracing-subscriber setup for applications embedding medvault.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{MedvaultError, MedvaultResult};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` wins over `config.level` when set. Returns an error (instead of
/// panicking) if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> MedvaultResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MedvaultError::Config(format!("log level '{}': {e}", config.level)))?;

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        "text" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
        other => {
            return Err(MedvaultError::Config(format!(
                "unknown log format '{other}' (expected json or text)"
            )))
        }
    };

    result.map_err(|e| MedvaultError::Config(format!("installing log subscriber: {e}")))
}
