//! Tracing subscriber setup

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::shared::config::LoggingConfig;
use crate::shared::errors::AppError;

/// Installs the global subscriber. `RUST_LOG` wins over `config.level`.
///
/// Console output is compact text, or JSON when `config.json` is set. A configured
/// `config.file` additionally receives every event as JSON lines.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| AppError::Logging(format!("invalid log level {:?}: {}", config.level, e)))?,
    };

    let console = if config.json {
        fmt::layer().with_target(false).json().boxed()
    } else {
        fmt::layer().with_target(false).compact().boxed()
    };

    let file = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::Logging(format!("cannot open log file {}: {}", path, e)))?;
            Some(fmt::layer().json().with_ansi(false).with_writer(Mutex::new(file)).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
