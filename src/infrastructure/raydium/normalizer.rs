//! Maps classified listing entries onto the canonical `PoolRecord`

use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use tracing::warn;

use crate::domain::pool::{PoolRecord, PoolVariant};
use crate::shared::errors::NormalizeError;

use super::api_types::{LegacyPoolV4, RawPool, TypedPoolV3};

const STANDARD_TYPE: &str = "Standard";
const CONCENTRATED_TYPE: &str = "Concentrated";

/// Normalizes one listing entry.
///
/// Unrecognized layouts become `PoolVariant::Unknown` records with a warning. Entries
/// without an id, or with mint addresses that are not valid public keys, are errors.
pub fn normalize_pool(raw: RawPool) -> Result<PoolRecord, NormalizeError> {
    match raw {
        RawPool::LegacyV4(pool) => normalize_legacy(pool),
        RawPool::Typed(pool) => match pool.pool_type.as_str() {
            STANDARD_TYPE => normalize_typed(pool, PoolVariant::StandardV3),
            CONCENTRATED_TYPE => normalize_typed(pool, PoolVariant::ConcentratedV3),
            other => {
                warn!(pool_id = %pool.id, pool_type = other, "Unknown pool type");
                Ok(PoolRecord::unknown(pool.id))
            }
        },
        RawPool::Other(value) => {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())
                .ok_or(NormalizeError::MissingId)?;
            warn!(
                pool_id = id,
                pool_type = ?value.get("type"),
                pool = %value,
                "Unknown pool structure"
            );
            Ok(PoolRecord::unknown(id))
        }
    }
}

fn normalize_legacy(pool: LegacyPoolV4) -> Result<PoolRecord, NormalizeError> {
    check_id(&pool.id)?;
    check_mint(&pool.id, &pool.base_mint)?;
    check_mint(&pool.id, &pool.quote_mint)?;

    Ok(PoolRecord {
        id: pool.id,
        variant: PoolVariant::LegacyV4,
        mint_a: pool.base_mint,
        mint_b: pool.quote_mint,
        mint_decimals_a: pool.base_decimals,
        mint_decimals_b: pool.quote_decimals,
        lp_mint: pool.lp_mint.unwrap_or_default(),
        circulating_supply: supply(pool.mint_amount_a),
        symbol_a: None,
        symbol_b: None,
    })
}

fn normalize_typed(pool: TypedPoolV3, variant: PoolVariant) -> Result<PoolRecord, NormalizeError> {
    check_id(&pool.id)?;
    check_mint(&pool.id, &pool.mint_a.address)?;
    check_mint(&pool.id, &pool.mint_b.address)?;

    let lp_mint = if variant.has_lp_token() {
        pool.lp_mint.map(|lp| lp.address).unwrap_or_default()
    } else {
        String::new()
    };

    Ok(PoolRecord {
        id: pool.id,
        variant,
        mint_a: pool.mint_a.address,
        mint_b: pool.mint_b.address,
        mint_decimals_a: pool.mint_a.decimals,
        mint_decimals_b: pool.mint_b.decimals,
        lp_mint,
        circulating_supply: supply(pool.mint_amount_a),
        symbol_a: pool.mint_a.symbol,
        symbol_b: pool.mint_b.symbol,
    })
}

fn check_id(id: &str) -> Result<(), NormalizeError> {
    if id.is_empty() {
        return Err(NormalizeError::MissingId);
    }
    Ok(())
}

fn check_mint(pool_id: &str, mint: &str) -> Result<(), NormalizeError> {
    Pubkey::from_str(mint).map(|_| ()).map_err(|_| NormalizeError::InvalidMint {
        pool_id: pool_id.to_string(),
        mint: mint.to_string(),
    })
}

fn supply(amount: Option<f64>) -> f64 {
    amount.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}
