//! Signal domain - FDV based buy/skip decisions for freshly listed pools

mod signal_evaluator;

pub use signal_evaluator::evaluate;

use serde::{Deserialize, Serialize};

/// Thresholds the evaluator compares against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Upper FDV bound for a buy
    pub target_fdv: f64,
    /// Lower liquidity bound for a buy
    pub min_liquidity: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            target_fdv: 1_000_000.0,
            min_liquidity: 200_000.0,
        }
    }
}

/// Outcome of evaluating a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    SkipInvalidFdv,
    SkipInsufficientLiquidity,
    SkipFdvTooHigh,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "buy",
            Decision::SkipInvalidFdv => "skip_invalid_fdv",
            Decision::SkipInsufficientLiquidity => "skip_insufficient_liquidity",
            Decision::SkipFdvTooHigh => "skip_fdv_too_high",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Decision::Buy)
    }
}

/// Derived metrics plus the decision taken on them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub fdv: f64,
    pub liquidity: f64,
    pub decision: Decision,
}
