//! Pure FDV / liquidity decision function

use crate::domain::pool::{PoolDetail, PoolRecord};

use super::{Decision, Signal, ThresholdConfig};

/// Computes FDV = price x circulating supply and decides buy/skip.
///
/// Checks run in a fixed order: invalid FDV, then liquidity floor, then FDV ceiling.
pub fn evaluate(record: &PoolRecord, detail: &PoolDetail, thresholds: &ThresholdConfig) -> Signal {
    let fdv = detail.price * record.circulating_supply;
    let liquidity = detail.liquidity;

    let decision = if !(fdv.is_finite() && fdv > 0.0) {
        Decision::SkipInvalidFdv
    } else if liquidity < thresholds.min_liquidity {
        Decision::SkipInsufficientLiquidity
    } else if fdv <= thresholds.target_fdv {
        Decision::Buy
    } else {
        Decision::SkipFdvTooHigh
    };

    Signal {
        fdv: if fdv.is_finite() { fdv } else { 0.0 },
        liquidity,
        decision,
    }
}
