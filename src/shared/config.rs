//! Configuration: built-in defaults, then `Config.toml`, then environment, then CLI overrides

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::domain::signal::ThresholdConfig;
use crate::infrastructure::raydium::api_client::DEFAULT_API_URL;
use crate::infrastructure::retry::RetryPolicy;
use crate::shared::errors::ConfigError;

/// File picked up when no `--config` path is given
pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_endpoint: String,
    pub registry_url: String,
    pub cluster: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            registry_url: DEFAULT_API_URL.to_string(),
            cluster: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub page_size: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 60_000,
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub target_fdv: f64,
    pub min_liquidity: f64,
    /// Reserved for position management, not used by the buy decision
    pub take_profit_fdv: f64,
    /// Reserved for position management, not used by the buy decision
    pub take_loss_fdv: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            target_fdv: 1_000_000.0,
            min_liquidity: 200_000.0,
            take_profit_fdv: 2_000_000.0,
            take_loss_fdv: 700_000.0,
        }
    }
}

impl ThresholdsConfig {
    pub fn decision_thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            target_fdv: self.target_fdv,
            min_liquidity: self.min_liquidity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Reserved: there is no execution path
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

/// Effective bot configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub network: NetworkConfig,
    pub monitor: MonitorConfig,
    pub thresholds: ThresholdsConfig,
    pub trading: TradingConfig,
    pub retry: RetryPolicy,
    pub logging: LoggingConfig,
}

/// Command-line values that win over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_endpoint: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub target_fdv: Option<f64>,
    pub min_liquidity: Option<f64>,
    pub json_logs: bool,
}

impl BotConfig {
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(rpc) = &overrides.rpc_endpoint {
            self.network.rpc_endpoint = rpc.clone();
        }
        if let Some(interval) = overrides.poll_interval_ms {
            self.monitor.poll_interval_ms = interval;
        }
        if let Some(target) = overrides.target_fdv {
            self.thresholds.target_fdv = target;
        }
        if let Some(min_liquidity) = overrides.min_liquidity {
            self.thresholds.min_liquidity = min_liquidity;
        }
        if overrides.json_logs {
            self.logging.json = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.rpc_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("network.rpc_endpoint must not be empty".to_string()));
        }
        if self.network.registry_url.trim().is_empty() {
            return Err(ConfigError::Invalid("network.registry_url must not be empty".to_string()));
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("monitor.poll_interval_ms must be positive".to_string()));
        }
        if self.monitor.page_size == 0 {
            return Err(ConfigError::Invalid("monitor.page_size must be positive".to_string()));
        }

        let thresholds = [
            ("thresholds.target_fdv", self.thresholds.target_fdv),
            ("thresholds.min_liquidity", self.thresholds.min_liquidity),
            ("thresholds.take_profit_fdv", self.thresholds.take_profit_fdv),
            ("thresholds.take_loss_fdv", self.thresholds.take_loss_fdv),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            return Err(ConfigError::Invalid("retry.backoff_factor must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Loads `BotConfig` from its sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the TOML file, then process environment.
    ///
    /// An explicit `path` must exist; without one `Config.toml` is read only if present.
    pub fn load(path: Option<&Path>) -> Result<BotConfig, ConfigError> {
        let mut config = match Self::config_path(path) {
            Some(path) => Self::from_file(&path)?,
            None => BotConfig::default(),
        };

        Self::apply_env(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// File `load` reads for the given `--config` value, if any
    pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
            None => None,
        }
    }

    pub fn from_file(path: &Path) -> Result<BotConfig, ConfigError> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        BotConfig::from_toml_str(&content, &path_str)
    }

    /// Applies the environment variables the bot understands. `lookup` abstracts `std::env::var`.
    pub fn apply_env<F>(config: &mut BotConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rpc) = lookup("RPC_ENDPOINT") {
            config.network.rpc_endpoint = rpc;
        }
        if let Some(url) = lookup("REGISTRY_URL") {
            config.network.registry_url = url;
        }
        if let Some(cluster) = lookup("CLUSTER_URL") {
            config.network.cluster = Some(cluster);
        }

        let interval = lookup("POOL_CHECK_INTERVAL")
            .map(|v| ("POOL_CHECK_INTERVAL", v))
            .or_else(|| lookup("CHECK_INTERVAL").map(|v| ("CHECK_INTERVAL", v)));
        if let Some((name, value)) = interval {
            config.monitor.poll_interval_ms = parse_env(name, &value)?;
        }

        if let Some(value) = lookup("TARGET_FDV") {
            config.thresholds.target_fdv = parse_env("TARGET_FDV", &value)?;
        }
        if let Some(value) = lookup("MIN_LIQ_TO_BUY") {
            config.thresholds.min_liquidity = parse_env("MIN_LIQ_TO_BUY", &value)?;
        }
        if let Some(value) = lookup("TAKE_PROFIT_FDV") {
            config.thresholds.take_profit_fdv = parse_env("TAKE_PROFIT_FDV", &value)?;
        }
        if let Some(value) = lookup("TAKE_LOSS_FDV") {
            config.thresholds.take_loss_fdv = parse_env("TAKE_LOSS_FDV", &value)?;
        }
        if let Some(value) = lookup("TRADING_ENABLED") {
            config.trading.enabled = value.trim() == "true";
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
