//! Poolscout - Raydium new-pool monitor
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{PoolMonitor, PoolMonitorConfig, SignalReport, TickSummary};
pub use domain::pool::{PoolDetail, PoolRecord, PoolVariant, SeenSet};
pub use domain::signal::{evaluate, Decision, Signal, ThresholdConfig};
pub use infrastructure::raydium::{PoolApi, PoolRegistryClient, RaydiumApiClient, UninitializedRegistry};
pub use infrastructure::retry::{execute_with_retry, RetryPolicy};
pub use shared::config::{BotConfig, ConfigLoader};
pub use shared::errors::{AppError, RegistryError};
