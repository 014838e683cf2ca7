//! CLI commands and handlers
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::application::pool_monitor::{PoolMonitor, PoolMonitorConfig};
use crate::infrastructure::raydium::{RaydiumApiClient, UninitializedRegistry};
use crate::shared::config::{BotConfig, ConfigOverrides};

#[derive(Parser)]
#[command(name = "poolscout", version)]
#[command(about = "Raydium new-pool monitor with simulated FDV buy signals")]
pub struct Cli {
    /// Path to a TOML config file (defaults to Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the registry for new pools and evaluate them
    Monitor {
        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Maximum FDV for a buy signal
        #[arg(long)]
        target_fdv: Option<f64>,

        /// Minimum liquidity for a buy signal
        #[arg(long)]
        min_liquidity: Option<f64>,

        /// Solana RPC endpoint used for the startup handshake
        #[arg(long)]
        rpc_endpoint: Option<String>,

        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Fetch the current listing once and print it
    Pools {
        /// Limit number of pools to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Also fetch details and show the decision for each pool
        #[arg(long)]
        detailed: bool,
    },

    /// Show the effective configuration
    Status,
}

impl Commands {
    /// CLI values that override file and environment settings
    pub fn overrides(&self, json_logs: bool) -> ConfigOverrides {
        match self {
            Commands::Monitor { interval_ms, target_fdv, min_liquidity, rpc_endpoint, .. } => ConfigOverrides {
                rpc_endpoint: rpc_endpoint.clone(),
                poll_interval_ms: *interval_ms,
                target_fdv: *target_fdv,
                min_liquidity: *min_liquidity,
                json_logs,
            },
            _ => ConfigOverrides {
                json_logs,
                ..ConfigOverrides::default()
            },
        }
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: BotConfig) -> Result<()> {
        match command {
            Commands::Monitor { duration, .. } => Self::execute_monitor_command(duration, config).await,
            Commands::Pools { limit, detailed } => Self::execute_pools_command(limit, detailed, config).await,
            Commands::Status => Self::execute_status_command(&config),
        }
    }

    fn registry(config: &BotConfig) -> Result<UninitializedRegistry<RaydiumApiClient>> {
        let api = RaydiumApiClient::new(
            config.network.registry_url.clone(),
            config.network.rpc_endpoint.clone(),
            config.monitor.page_size,
        )?;
        Ok(UninitializedRegistry::new(api, config.retry.clone()))
    }

    /// Execute monitor command
    async fn execute_monitor_command(duration: Option<u64>, config: BotConfig) -> Result<()> {
        info!(rpc = %config.network.rpc_endpoint, registry = %config.network.registry_url, "Starting pool monitor...");

        let registry = Self::registry(&config)?;
        let monitor_config = PoolMonitorConfig::from_bot_config(&config);

        let shutdown = async move {
            match duration {
                Some(secs) => {
                    info!(seconds = secs, "Monitor will stop after the configured duration");
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                        _ = ctrl_c() => {}
                    }
                }
                None => ctrl_c().await,
            }
        };

        let stats = PoolMonitor::start(registry, monitor_config, shutdown)
            .await
            .context("Failed to start pool monitor")?;

        info!(
            ticks = stats.ticks_completed,
            buy_signals = stats.buy_signals,
            "Monitoring finished"
        );
        Ok(())
    }

    /// Execute pools command
    async fn execute_pools_command(limit: usize, detailed: bool, config: BotConfig) -> Result<()> {
        let registry = Self::registry(&config)?
            .initialize()
            .await
            .context("Failed to initialize pool registry")?;

        let listing = registry.fetch_all_pools().await?;
        let pools = listing.records;
        let shown: Vec<_> = pools.iter().take(limit).cloned().collect();
        info!(
            total = pools.len(),
            rejected = listing.rejected,
            shown = shown.len(),
            "Fetched pool listing"
        );

        if !detailed {
            for (i, pool) in shown.iter().enumerate() {
                println!(
                    "{:>3}. {:<16} {:<15} {}",
                    i + 1,
                    pool.pair_label(),
                    pool.variant.as_str(),
                    pool.id
                );
            }
            return Ok(());
        }

        let monitor = PoolMonitor::with_registry(registry, PoolMonitorConfig::from_bot_config(&config));
        for (i, report) in monitor.evaluate_pools(&shown).await.iter().enumerate() {
            println!(
                "{:>3}. {:<16} {:<15} {} price={} liquidity={} fdv={} -> {}",
                i + 1,
                report.pair,
                report.variant.as_str(),
                report.pool_id,
                report.price,
                report.liquidity,
                report.fdv,
                report.decision.as_str()
            );
        }
        Ok(())
    }

    /// Execute status command
    fn execute_status_command(config: &BotConfig) -> Result<()> {
        println!("poolscout {}", env!("CARGO_PKG_VERSION"));
        println!("{}", toml::to_string_pretty(config).context("Failed to render configuration")?);
        Ok(())
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_flags_become_overrides() {
        let cli = Cli::parse_from([
            "poolscout",
            "--json-logs",
            "monitor",
            "--interval-ms",
            "5000",
            "--target-fdv",
            "250000",
            "--duration",
            "30",
        ]);
        assert!(cli.json_logs);

        let overrides = cli.command.overrides(cli.json_logs);
        assert_eq!(overrides.poll_interval_ms, Some(5_000));
        assert_eq!(overrides.target_fdv, Some(250_000.0));
        assert_eq!(overrides.min_liquidity, None);
        assert!(overrides.json_logs);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["poolscout", "pools", "--detailed", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Pools { limit: 10, detailed: true }));
    }
}
