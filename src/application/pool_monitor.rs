//! New-pool monitor: fetch, dedup, detail lookup and signal evaluation on a fixed interval

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::report::SignalReport;
use crate::domain::pool::{PoolDetail, PoolRecord, SeenSet};
use crate::domain::signal::{evaluate, ThresholdConfig};
use crate::infrastructure::raydium::{PoolApi, PoolRegistryClient, UninitializedRegistry};
use crate::shared::config::BotConfig;
use crate::shared::errors::RegistryError;

/// Shortest period the loop ticks at
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Monitor settings
#[derive(Debug, Clone)]
pub struct PoolMonitorConfig {
    pub poll_interval: Duration,
    pub thresholds: ThresholdConfig,
    pub take_profit_fdv: f64,
    pub take_loss_fdv: f64,
    pub trading_enabled: bool,
}

impl PoolMonitorConfig {
    pub fn from_bot_config(config: &BotConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.monitor.poll_interval_ms),
            thresholds: config.thresholds.decision_thresholds(),
            take_profit_fdv: config.thresholds.take_profit_fdv,
            take_loss_fdv: config.thresholds.take_loss_fdv,
            trading_enabled: config.trading.enabled,
        }
    }
}

/// Counters for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick_id: Uuid,
    pub listed: usize,
    pub new_pools: usize,
    pub processed: usize,
    pub failed: usize,
    pub buy_signals: usize,
}

impl TickSummary {
    fn new(tick_id: Uuid) -> Self {
        Self {
            tick_id,
            listed: 0,
            new_pools: 0,
            processed: 0,
            failed: 0,
            buy_signals: 0,
        }
    }
}

/// Result of a tick: counters plus the emitted reports
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub summary: TickSummary,
    pub reports: Vec<SignalReport>,
}

/// Lifetime counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorStats {
    pub ticks_completed: u64,
    pub ticks_failed: u64,
    pub pools_processed: u64,
    pub buy_signals: u64,
}

pub struct PoolMonitor<A> {
    registry: PoolRegistryClient<A>,
    seen: SeenSet,
    config: PoolMonitorConfig,
    stats: MonitorStats,
}

impl<A: PoolApi> PoolMonitor<A> {
    /// Runs the registry handshake. The monitor cannot exist without a ready client.
    pub async fn initialize(
        registry: UninitializedRegistry<A>,
        config: PoolMonitorConfig,
    ) -> Result<Self, RegistryError> {
        let registry = registry.initialize().await?;
        Ok(Self::with_registry(registry, config))
    }

    pub fn with_registry(registry: PoolRegistryClient<A>, config: PoolMonitorConfig) -> Self {
        Self {
            registry,
            seen: SeenSet::new(),
            config,
            stats: MonitorStats::default(),
        }
    }

    /// Initializes, then ticks every `poll_interval` until `shutdown` resolves.
    ///
    /// Only initialization errors are returned; tick failures are logged and the loop goes on.
    pub async fn start<F>(
        registry: UninitializedRegistry<A>,
        config: PoolMonitorConfig,
        shutdown: F,
    ) -> Result<MonitorStats, RegistryError>
    where
        F: Future<Output = ()>,
    {
        let mut monitor = Self::initialize(registry, config).await?;
        monitor.run(shutdown).await;
        Ok(monitor.stats)
    }

    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            target_fdv = self.config.thresholds.target_fdv,
            min_liquidity = self.config.thresholds.min_liquidity,
            take_profit_fdv = self.config.take_profit_fdv,
            take_loss_fdv = self.config.take_loss_fdv,
            "Starting pool monitor"
        );
        if self.config.trading_enabled {
            warn!("Trading is enabled but there is no execution path, signals stay simulated");
        }

        if self.config.poll_interval.is_zero() {
            warn!(min_ms = MIN_POLL_INTERVAL.as_millis() as u64, "Poll interval is zero, using the minimum");
        }
        let mut ticker = tokio::time::interval(self.config.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping pool monitor");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_tick().await {
                        Ok(outcome) => {
                            self.stats.ticks_completed += 1;
                            self.stats.pools_processed += outcome.summary.processed as u64;
                            self.stats.buy_signals += outcome.summary.buy_signals as u64;
                        }
                        Err(e) => {
                            self.stats.ticks_failed += 1;
                            error!(error = %e, "Error fetching Raydium pools, will retry next tick");
                        }
                    }
                }
            }
        }

        info!(
            ticks = self.stats.ticks_completed,
            failed_ticks = self.stats.ticks_failed,
            pools = self.stats.pools_processed,
            buy_signals = self.stats.buy_signals,
            known_pools = self.seen.len(),
            "Pool monitor stopped"
        );
    }

    /// One fetch-dedup-evaluate cycle. Pools are marked seen only once their report was emitted.
    pub async fn run_tick(&mut self) -> Result<TickOutcome, RegistryError> {
        let tick_id = Uuid::new_v4();
        let span = info_span!("tick", %tick_id);
        self.tick(tick_id).instrument(span).await
    }

    async fn tick(&mut self, tick_id: Uuid) -> Result<TickOutcome, RegistryError> {
        let mut summary = TickSummary::new(tick_id);
        info!("Fetching Raydium pools...");

        let listing = self.registry.fetch_all_pools().await?;
        summary.listed = listing.records.len() + listing.rejected;
        summary.failed = listing.rejected;

        let new_pools = self.seen.filter_unseen(listing.records);
        summary.new_pools = new_pools.len();
        if new_pools.is_empty() {
            debug!(listed = summary.listed, failed = summary.failed, "No new pools");
            return Ok(TickOutcome { summary, reports: Vec::new() });
        }
        info!(count = new_pools.len(), "Found new pools");

        let reports = self.evaluate_pools(&new_pools).await;
        let mut emitted = Vec::with_capacity(reports.len());

        for report in reports {
            report.log(self.config.thresholds.min_liquidity);
            self.seen.mark_seen(&report.pool_id);
            summary.processed += 1;
            if report.decision.is_buy() {
                summary.buy_signals += 1;
            }
            emitted.push(report);
        }

        info!(
            listed = summary.listed,
            new_pools = summary.new_pools,
            processed = summary.processed,
            failed = summary.failed,
            buy_signals = summary.buy_signals,
            "Tick complete"
        );
        Ok(TickOutcome { summary, reports: emitted })
    }

    /// Fetches details for `records` and evaluates each one. Does not touch the seen set.
    pub async fn evaluate_pools(&self, records: &[PoolRecord]) -> Vec<SignalReport> {
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let details = self.registry.fetch_details(&ids).await;

        records
            .iter()
            .map(|record| {
                let detail = details.get(&record.id).copied().unwrap_or_else(PoolDetail::zero);
                let signal = evaluate(record, &detail, &self.config.thresholds);
                SignalReport::new(record, &detail, &signal)
            })
            .collect()
    }

    pub fn registry(&self) -> &PoolRegistryClient<A> {
        &self.registry
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}
