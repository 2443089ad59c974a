use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LogFormat, ProtectorConfig};

/// Install the global subscriber.
///
/// Uses `RUST_LOG` if set, otherwise the configured `LOG_LEVEL`. Until this is
/// called every log statement in the crate is a no-op.
pub fn init_tracing(config: &ProtectorConfig) -> Result<(), ConfigError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level).map_err(|error| {
            ConfigError::Telemetry(format!(
                "invalid log level filter {:?}: {error}",
                config.log_level
            ))
        })?
    };

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(false)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|error| ConfigError::Telemetry(error.to_string()))
}
