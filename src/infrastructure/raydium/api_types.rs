//! Wire shapes returned by the Raydium v3 API.
//!
//! The listing mixes several pool layouts. `RawPool` decides the layout once, at decode
//! time, so the rest of the crate never checks for field presence. Numeric fields are
//! decoded leniently: a missing, null or non-numeric value becomes `None`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::pool::PoolDetail;

/// `{ id, success, data, msg }` wrapper around every Raydium v3 response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub msg: Option<String>,
}

/// One page of `/pools/info/list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolListPage {
    /// `None` when the payload carried no usable sequence
    #[serde(default, deserialize_with = "sequence_or_none")]
    pub data: Option<Vec<RawPool>>,
    #[serde(rename = "hasNextPage", default, deserialize_with = "bool_or_false")]
    pub has_next_page: bool,
    #[serde(default, deserialize_with = "number_or_none")]
    pub count: Option<f64>,
}

impl PoolListPage {
    /// Lenient conversion from the envelope payload; anything unusable yields an empty page
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Listing entry, classified by layout
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPool {
    /// Legacy AMM v4 entry with flat base/quote fields
    LegacyV4(LegacyPoolV4),
    /// v3 entry carrying a `type` discriminator
    Typed(TypedPoolV3),
    /// Anything else, kept verbatim for diagnostics
    Other(Value),
}

impl RawPool {
    pub fn id(&self) -> Option<&str> {
        match self {
            RawPool::LegacyV4(pool) => Some(pool.id.as_str()),
            RawPool::Typed(pool) => Some(pool.id.as_str()),
            RawPool::Other(value) => value.get("id").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPoolV4 {
    pub id: String,
    pub base_mint: String,
    pub quote_mint: String,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    #[serde(default, deserialize_with = "string_or_none")]
    pub lp_mint: Option<String>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub mint_amount_a: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedPoolV3 {
    pub id: String,
    #[serde(rename = "type")]
    pub pool_type: String,
    pub mint_a: RawMint,
    pub mint_b: RawMint,
    #[serde(default, deserialize_with = "mint_or_none")]
    pub lp_mint: Option<RawMint>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub mint_amount_a: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMint {
    pub address: String,
    #[serde(default, deserialize_with = "decimals_or_zero")]
    pub decimals: u8,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Entry of `/pools/info/ids`. Flat pools expose `price`/`liquidity`/`volume24h`,
/// concentrated ones `currentPrice`/`tvl`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPoolDetail {
    #[serde(default, deserialize_with = "string_or_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub liquidity: Option<f64>,
    #[serde(rename = "volume24h", default, deserialize_with = "number_or_none")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "currentPrice", default, deserialize_with = "number_or_none")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub tvl: Option<f64>,
    #[serde(rename = "day", default, deserialize_with = "nested_volume")]
    pub day_volume: Option<f64>,
}

impl RawPoolDetail {
    /// `None` for null or non-object entries
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Direct fields first, concentrated-style fields second, zero last
    pub fn to_detail(&self) -> PoolDetail {
        PoolDetail::new(
            self.price.or(self.current_price).unwrap_or(0.0),
            self.liquidity.or(self.tvl).unwrap_or(0.0),
            self.volume_24h.or(self.day_volume).unwrap_or(0.0),
        )
    }
}

/// `data` of `/pools/info/ids`: usually an array aligned with the requested ids,
/// some deployments answer with a map keyed by id
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PoolDetailsPayload {
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl PoolDetailsPayload {
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Details found for the requested ids. Missing and null entries are left out.
    pub fn resolve(self, ids: &[String]) -> HashMap<String, PoolDetail> {
        let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut resolved = HashMap::new();

        match self {
            PoolDetailsPayload::Map(entries) => {
                for (id, value) in entries {
                    if !requested.contains(id.as_str()) {
                        continue;
                    }
                    if let Some(raw) = RawPoolDetail::from_value(value) {
                        resolved.insert(id, raw.to_detail());
                    }
                }
            }
            PoolDetailsPayload::List(entries) => {
                let mut positional = Vec::new();
                for (position, value) in entries.into_iter().enumerate() {
                    let Some(raw) = RawPoolDetail::from_value(value) else {
                        continue;
                    };
                    match raw.id.clone() {
                        Some(id) if requested.contains(id.as_str()) => {
                            resolved.entry(id).or_insert_with(|| raw.to_detail());
                        }
                        // Another pool's record; never credit it to a requested id
                        Some(_) => {}
                        None => positional.push((position, raw)),
                    }
                }

                // Id-less entries only fill slots no entry claimed by id
                for (position, raw) in positional {
                    if let Some(id) = ids.get(position) {
                        resolved.entry(id.clone()).or_insert_with(|| raw.to_detail());
                    }
                }
            }
        }

        resolved
    }
}

/// Numbers, or strings holding a number
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn number_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(lenient_number(&Value::deserialize(deserializer)?))
}

fn decimals_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(lenient_number(&Value::deserialize(deserializer)?)
        .filter(|d| d.fract() == 0.0 && (0.0..=u8::MAX as f64).contains(d))
        .map(|d| d as u8)
        .unwrap_or(0))
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_string))
}

fn bool_or_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

fn sequence_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<RawPool>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item.clone()).unwrap_or(RawPool::Other(item)))
                .collect(),
        )),
        _ => Ok(None),
    }
}

fn mint_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RawMint>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

fn nested_volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .get("volume")
        .and_then(lenient_number))
}
