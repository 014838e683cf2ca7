//! Error handling for the application

use thiserror::Error;

/// Errors produced while talking to the pool registry (HTTP API or RPC node)
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("Rate limited by {endpoint} (HTTP 429)")]
    RateLimited { endpoint: String },

    #[error("Server error {status} from {endpoint}")]
    ServerError { status: u16, endpoint: String },

    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client initialization failed: {0}")]
    Initialization(String),
}

impl RegistryError {
    /// Transient failures worth another attempt: 429, 5xx, connection drops and timeouts
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::RateLimited { .. }
                | RegistryError::ServerError { .. }
                | RegistryError::Connection(_)
                | RegistryError::Timeout(_)
        )
    }

    /// Classify an HTTP status returned by `endpoint`
    pub fn from_status(status: u16, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        match status {
            429 => RegistryError::RateLimited { endpoint },
            500..=599 => RegistryError::ServerError { status, endpoint },
            _ => RegistryError::UnexpectedStatus { status, endpoint },
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RegistryError::Timeout(err.to_string())
        } else if err.is_connect() {
            RegistryError::Connection(err.to_string())
        } else if err.is_decode() {
            RegistryError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            let endpoint = err.url().map(|u| u.to_string()).unwrap_or_default();
            RegistryError::from_status(status.as_u16(), endpoint)
        } else if is_connection_reset(&err) {
            RegistryError::Connection(err.to_string())
        } else {
            RegistryError::Request(err.to_string())
        }
    }
}

/// Walks the source chain looking for an io error of kind ConnectionReset / BrokenPipe
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            );
        }
        source = cause.source();
    }
    false
}

/// A single raw pool record that could not be turned into a `PoolRecord`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Pool record has no id")]
    MissingId,

    #[error("Invalid mint address {mint} in pool {pool_id}")]
    InvalidMint { pool_id: String, mint: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
