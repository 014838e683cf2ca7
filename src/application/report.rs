// src/application/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::pool::{PoolDetail, PoolRecord, PoolVariant};
use crate::domain::signal::{Decision, Signal};

/// Evaluation outcome for one newly listed pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub pool_id: String,
    pub variant: PoolVariant,
    pub pair: String,
    pub mint_a: String,
    pub mint_b: String,
    pub lp_mint: String,

    // Market data
    pub circulating_supply: f64,
    pub price: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub fdv: f64,

    pub decision: Decision,
    /// Always 0: signals are simulated, nothing is bought
    pub holding: f64,
    pub timestamp: DateTime<Utc>,
}

impl SignalReport {
    pub fn new(record: &PoolRecord, detail: &PoolDetail, signal: &Signal) -> Self {
        Self {
            pool_id: record.id.clone(),
            variant: record.variant,
            pair: record.pair_label(),
            mint_a: record.mint_a.clone(),
            mint_b: record.mint_b.clone(),
            lp_mint: record.lp_mint.clone(),
            circulating_supply: record.circulating_supply,
            price: detail.price,
            liquidity: signal.liquidity,
            volume_24h: detail.volume_24h,
            fdv: signal.fdv,
            decision: signal.decision,
            holding: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Emits the report as structured events
    pub fn log(&self, min_liquidity: f64) {
        info!(
            pool_id = %self.pool_id,
            pair = %self.pair,
            variant = self.variant.as_str(),
            mint = %self.mint_a,
            supply = self.circulating_supply,
            price = self.price,
            fdv = self.fdv,
            liquidity = self.liquidity,
            volume_24h = self.volume_24h,
            "New pool detected"
        );
        if let Ok(json) = self.to_json() {
            debug!(report = %json, "Signal report");
        }

        match self.decision {
            Decision::Buy => info!(
                mint = %self.mint_a,
                fdv = self.fdv,
                liquidity = self.liquidity,
                holding = self.holding,
                "Trigger buy (simulated)"
            ),
            Decision::SkipInvalidFdv => info!(
                pool_id = %self.pool_id,
                price = self.price,
                supply = self.circulating_supply,
                "Skipping buy signal - invalid FDV"
            ),
            Decision::SkipInsufficientLiquidity => info!(
                pool_id = %self.pool_id,
                liquidity = self.liquidity,
                min_liquidity,
                "Skipping buy signal - insufficient liquidity"
            ),
            Decision::SkipFdvTooHigh => info!(
                pool_id = %self.pool_id,
                fdv = self.fdv,
                "Skipping buy signal - FDV above target"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{evaluate, ThresholdConfig};

    fn record() -> PoolRecord {
        PoolRecord {
            id: "pool".to_string(),
            variant: PoolVariant::StandardV3,
            mint_a: "So11111111111111111111111111111111111111112".to_string(),
            mint_b: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            mint_decimals_a: 9,
            mint_decimals_b: 6,
            lp_mint: String::new(),
            circulating_supply: 400_000.0,
            symbol_a: Some("MEME".to_string()),
            symbol_b: None,
        }
    }

    #[test]
    fn test_report_carries_signal() {
        let detail = PoolDetail::new(2.0, 500_000.0, 42.0);
        let signal = evaluate(&record(), &detail, &ThresholdConfig::default());
        let report = SignalReport::new(&record(), &detail, &signal);

        assert_eq!(report.decision, Decision::Buy);
        assert_eq!(report.fdv, 800_000.0);
        assert_eq!(report.pair, "MEME/WSOL");
        assert_eq!(report.holding, 0.0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let detail = PoolDetail::zero();
        let signal = evaluate(&record(), &detail, &ThresholdConfig::default());
        let json = SignalReport::new(&record(), &detail, &signal).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pool_id"], "pool");
        assert_eq!(value["decision"], "SkipInvalidFdv");
        assert!(value["timestamp"].is_string());
    }
}
