//! Canonical pool shapes shared by the registry client and the evaluator

use serde::{Deserialize, Serialize};

/// AMM mechanism behind a pool, decided once when the raw record is normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolVariant {
    LegacyV4,
    StandardV3,
    ConcentratedV3,
    Unknown,
}

impl PoolVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolVariant::LegacyV4 => "Legacy V4",
            PoolVariant::StandardV3 => "Standard V3",
            PoolVariant::ConcentratedV3 => "Concentrated V3",
            PoolVariant::Unknown => "Unknown",
        }
    }

    /// Concentrated pools carry no fungible LP token
    pub fn has_lp_token(&self) -> bool {
        matches!(self, PoolVariant::LegacyV4 | PoolVariant::StandardV3)
    }
}

/// Normalized pool listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub id: String,
    pub variant: PoolVariant,
    pub mint_a: String,
    pub mint_b: String,
    pub mint_decimals_a: u8,
    pub mint_decimals_b: u8,
    /// Empty for concentrated and unknown pools
    pub lp_mint: String,
    /// Token-A amount reported by the listing (`mintAmountA`), 0 when absent
    pub circulating_supply: f64,
    pub symbol_a: Option<String>,
    pub symbol_b: Option<String>,
}

impl PoolRecord {
    /// Degraded record for shapes the registry client does not recognize
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: PoolVariant::Unknown,
            mint_a: String::new(),
            mint_b: String::new(),
            mint_decimals_a: 0,
            mint_decimals_b: 0,
            lp_mint: String::new(),
            circulating_supply: 0.0,
            symbol_a: None,
            symbol_b: None,
        }
    }

    /// "BASE/QUOTE" label used in reports
    pub fn pair_label(&self) -> String {
        format!(
            "{}/{}",
            self.symbol_a.as_deref().unwrap_or("Unknown"),
            self.symbol_b.as_deref().unwrap_or("WSOL"),
        )
    }
}

/// Market data for a single pool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoolDetail {
    pub price: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
}

impl PoolDetail {
    /// All-zero detail used when the registry has nothing for a pool
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds a detail, clamping negative or non-finite inputs to zero
    pub fn new(price: f64, liquidity: f64, volume_24h: f64) -> Self {
        Self {
            price: non_negative(price),
            liquidity: non_negative(liquidity),
            volume_24h: non_negative(volume_24h),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.price == 0.0 && self.liquidity == 0.0 && self.volume_24h == 0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
