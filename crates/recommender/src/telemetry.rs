//! Structured logging setup

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{RecommenderError, Result};

/// Log output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: "info")
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins over the configured level
    pub fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level).map_err(|e| {
                RecommenderError::Configuration {
                    message: format!("invalid log level '{}': {}", self.level, e),
                    key: Some("logging.level".to_string()),
                }
            }),
        }
    }
}

/// Subscriber writing formatted events to `writer`
pub fn build_subscriber<W>(
    config: &LoggingConfig,
    writer: W,
) -> Result<impl Subscriber + Send + Sync + 'static>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = config.env_filter()?;

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_writer(writer).boxed()
    };

    Ok(tracing_subscriber::registry().with(fmt_layer).with(filter))
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so stdout only carries command output. Must be called
/// once at startup; a second call returns an error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    build_subscriber(config, std::io::stderr)?
        .try_init()
        .map_err(|e| RecommenderError::Configuration {
            message: format!("failed to initialize logging: {}", e),
            key: Some("logging".to_string()),
        })?;

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");

    Ok(())
}
