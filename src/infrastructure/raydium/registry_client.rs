//! Paginated pool listing and batched detail lookups on top of a `PoolApi`

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use super::api_types::RawPool;
use super::normalizer::normalize_pool;
use super::PoolApi;
use crate::domain::pool::{PoolDetail, PoolRecord};
use crate::infrastructure::retry::{execute_with_retry, RetryPolicy};
use crate::shared::errors::{NormalizeError, RegistryError};

/// Deadline for one page fetch, retries included
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
/// Hard cap on accumulated listing records
pub const MAX_POOLS: usize = 1000;
/// Pool ids per detail request
pub const DETAIL_BATCH_SIZE: usize = 20;
/// Detail requests allowed in flight at once
pub const MAX_CONCURRENT_DETAIL_REQUESTS: usize = 10;

/// Normalized listing plus the number of entries that could not be normalized
#[derive(Debug, Clone, Default)]
pub struct PoolListing {
    pub records: Vec<PoolRecord>,
    pub rejected: usize,
}

/// Registry client before the connection handshake. It exposes no fetch operations.
pub struct UninitializedRegistry<A> {
    api: A,
    retry: RetryPolicy,
}

impl<A: PoolApi> UninitializedRegistry<A> {
    pub fn new(api: A, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// Performs the handshake and hands back a usable client
    pub async fn initialize(self) -> Result<PoolRegistryClient<A>, RegistryError> {
        info!("Initializing pool registry client...");

        let handshake = execute_with_retry(&self.retry, "registry handshake", || self.api.connect()).await;
        match handshake {
            Ok(()) => {
                info!("Pool registry client initialized successfully");
                Ok(PoolRegistryClient {
                    api: self.api,
                    retry: self.retry,
                    page_timeout: PAGE_TIMEOUT,
                    max_pools: MAX_POOLS,
                    detail_batch_size: DETAIL_BATCH_SIZE,
                })
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize pool registry client");
                Err(match e {
                    RegistryError::Initialization(_) => e,
                    other => RegistryError::Initialization(other.to_string()),
                })
            }
        }
    }
}

/// Ready registry client, only obtainable through `UninitializedRegistry::initialize`
pub struct PoolRegistryClient<A> {
    api: A,
    retry: RetryPolicy,
    page_timeout: Duration,
    max_pools: usize,
    detail_batch_size: usize,
}

impl<A: PoolApi> PoolRegistryClient<A> {
    pub fn with_page_timeout(mut self, page_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self
    }

    pub fn with_detail_batch_size(mut self, size: usize) -> Self {
        self.detail_batch_size = size.max(1);
        self
    }

    /// Walks the listing and normalizes every entry.
    ///
    /// Entries that fail normalization are logged and counted in `rejected`; siblings are kept.
    pub async fn fetch_all_pools(&self) -> Result<PoolListing, RegistryError> {
        let raw_pools = self.fetch_all_pages().await?;
        let listed = raw_pools.len();

        let mut listing = PoolListing {
            records: Vec::with_capacity(listed),
            rejected: 0,
        };
        for raw in raw_pools {
            let id = raw.id().map(str::to_string);
            match normalize_pool(raw) {
                Ok(record) => listing.records.push(record),
                Err(e) => {
                    listing.rejected += 1;
                    match e {
                        NormalizeError::MissingId => warn!(error = %e, "Skipping untrackable pool record"),
                        _ => error!(pool_id = ?id, error = %e, "Skipping invalid pool record"),
                    }
                }
            }
        }

        debug!(listed, normalized = listing.records.len(), rejected = listing.rejected, "Pool listing normalized");
        Ok(listing)
    }

    async fn fetch_all_pages(&self) -> Result<Vec<RawPool>, RegistryError> {
        let mut all_pools: Vec<RawPool> = Vec::new();
        let mut page: u32 = 1;

        loop {
            info!(page, "Fetching pool list page");

            let fetch = execute_with_retry(&self.retry, "pool list page", || self.api.fetch_pool_page(page));
            let response = match tokio::time::timeout(self.page_timeout, fetch).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) if page == 1 => return Err(e),
                Ok(Err(e)) => {
                    error!(page, error = %e, "Failed to fetch pool list page, stopping pagination");
                    break;
                }
                Err(_) if page == 1 => {
                    return Err(RegistryError::Timeout(format!(
                        "pool list page 1 took longer than {:?}",
                        self.page_timeout
                    )));
                }
                Err(_) => {
                    warn!(page, timeout = ?self.page_timeout, "Timeout fetching pool list, stopping pagination");
                    break;
                }
            };

            let Some(pools) = response.data else {
                warn!(page, "Invalid response for pool list page, stopping pagination");
                break;
            };
            if pools.is_empty() {
                debug!(page, "Empty pool list page, stopping pagination");
                break;
            }

            all_pools.extend(pools);

            if all_pools.len() >= self.max_pools {
                warn!(limit = self.max_pools, "Reached maximum pool limit, stopping pagination");
                all_pools.truncate(self.max_pools);
                break;
            }
            if !response.has_next_page {
                break;
            }
            page += 1;
        }

        info!(pools = all_pools.len(), pages = page, "Pool listing fetched");
        Ok(all_pools)
    }

    /// Details for every requested id. Ids the registry has nothing for map to zero details.
    pub async fn fetch_details(&self, ids: &[String]) -> HashMap<String, PoolDetail> {
        let batches: Vec<HashMap<String, PoolDetail>> = stream::iter(ids.chunks(self.detail_batch_size))
            .map(|batch| self.fetch_detail_batch(batch))
            .buffer_unordered(MAX_CONCURRENT_DETAIL_REQUESTS)
            .collect()
            .await;

        let mut details: HashMap<String, PoolDetail> = HashMap::with_capacity(ids.len());
        for batch in batches {
            details.extend(batch);
        }
        for id in ids {
            details.entry(id.clone()).or_insert_with(|| {
                debug!(pool_id = %id, "No detail data for pool, using zero values");
                PoolDetail::zero()
            });
        }
        details
    }

    async fn fetch_detail_batch(&self, batch: &[String]) -> HashMap<String, PoolDetail> {
        let result =
            execute_with_retry(&self.retry, "pool details", || self.api.fetch_pool_details(batch)).await;

        match result {
            Ok(payload) => {
                let resolved = payload.resolve(batch);
                for (id, detail) in &resolved {
                    debug!(
                        pool_id = %id,
                        price = detail.price,
                        liquidity = detail.liquidity,
                        volume_24h = detail.volume_24h,
                        "Pool details"
                    );
                }
                resolved
            }
            Err(e) => {
                warn!(batch_size = batch.len(), error = %e, "Failed to fetch pool details, using zero values");
                HashMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::PoolVariant;
    use crate::infrastructure::raydium::mock::{pool_json, MockPoolApi};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_factor: 2.0,
            jitter: false,
        }
    }

    async fn ready(api: Arc<MockPoolApi>) -> PoolRegistryClient<Arc<MockPoolApi>> {
        UninitializedRegistry::new(api, fast_retry()).initialize().await.unwrap()
    }

    #[tokio::test]
    async fn test_initialize_failure_is_reported() {
        let api = Arc::new(MockPoolApi::new(10).failing_connect(RegistryError::from_status(401, "rpc")));
        let result = UninitializedRegistry::new(api.clone(), fast_retry()).initialize().await;
        assert!(matches!(result, Err(RegistryError::Initialization(_))));
        assert_eq!(api.connect_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_paginates_until_last_page() {
        let pools = (0..25).map(|i| pool_json(&format!("pool-{}", i), 100.0)).collect();
        let api = Arc::new(MockPoolApi::new(10).with_pools(pools));
        let client = ready(api.clone()).await;

        let records = client.fetch_all_pools().await.unwrap().records;
        assert_eq!(records.len(), 25);
        assert_eq!(records[0].variant, PoolVariant::StandardV3);
        assert_eq!(api.page_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_endless_pagination_is_capped() {
        let api = Arc::new(MockPoolApi::new(300).endless());
        let client = ready(api.clone()).await;

        let records = client.fetch_all_pools().await.unwrap().records;
        assert_eq!(records.len(), MAX_POOLS);
        assert_eq!(api.page_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_invalid_page_shape_keeps_accumulated_pools() {
        let pools = (0..15).map(|i| pool_json(&format!("pool-{}", i), 1.0)).collect();
        let api = Arc::new(MockPoolApi::new(10).with_pools(pools).invalid_page(2));
        let client = ready(api).await;

        let records = client.fetch_all_pools().await.unwrap().records;
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_page_retries_transient_errors() {
        let api = Arc::new(MockPoolApi::new(10).with_pools(vec![pool_json("a", 1.0)]));
        api.push_page_error(RegistryError::from_status(429, "list"));
        api.push_page_error(RegistryError::Timeout("slow".to_string()));
        let client = ready(api.clone()).await;

        let records = client.fetch_all_pools().await.unwrap().records;
        assert_eq!(records.len(), 1);
        assert_eq!(api.page_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_first_page_terminal_error_fails_fetch() {
        let api = Arc::new(MockPoolApi::new(10).with_pools(vec![pool_json("a", 1.0)]));
        api.push_page_error(RegistryError::from_status(403, "list"));
        let client = ready(api.clone()).await;

        assert!(client.fetch_all_pools().await.is_err());
        assert_eq!(api.page_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_page_stops_pagination() {
        let pools = (0..15).map(|i| pool_json(&format!("pool-{}", i), 1.0)).collect();
        let api = Arc::new(MockPoolApi::new(10).with_pools(pools).slow_page(2, Duration::from_millis(200)));
        let client = ready(api).await.with_page_timeout(Duration::from_millis(50));

        let records = client.fetch_all_pools().await.unwrap().records;
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_bad_records_are_skipped_and_unknown_kept() {
        let api = Arc::new(MockPoolApi::new(10).with_pools(vec![
            pool_json("good", 1.0),
            json!({ "programId": "no id here" }),
            json!({ "id": "odd-shape" }),
            json!({
                "id": "bad-mint",
                "type": "Standard",
                "mintA": { "address": "zzz", "decimals": 9 },
                "mintB": { "address": "zzz", "decimals": 6 }
            }),
        ]));
        let client = ready(api).await;

        let listing = client.fetch_all_pools().await.unwrap();
        assert_eq!(listing.rejected, 2);
        let records = listing.records;
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "odd-shape"]);
        assert_eq!(records[1].variant, PoolVariant::Unknown);
    }

    #[tokio::test]
    async fn test_details_default_to_zero() {
        let api = Arc::new(
            MockPoolApi::new(10)
                .with_detail("a", json!({ "price": 2.0, "liquidity": 500000.0, "volume24h": 10.0 }))
                .with_detail("b", serde_json::Value::Null),
        );
        let client = ready(api).await;

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let details = client.fetch_details(&ids).await;
        assert_eq!(details.len(), 3);
        assert_eq!(details["a"], PoolDetail::new(2.0, 500_000.0, 10.0));
        assert!(details["b"].is_zero());
        assert!(details["c"].is_zero());
    }

    #[tokio::test]
    async fn test_failed_detail_batch_maps_to_zero() {
        let api = Arc::new(MockPoolApi::new(10).with_detail("a", json!({ "price": 2.0 })));
        api.push_detail_error(RegistryError::from_status(400, "ids"));
        let client = ready(api.clone()).await;

        let details = client.fetch_details(&["a".to_string()]).await;
        assert!(details["a"].is_zero());
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_detail_batches_are_bounded() {
        let api = Arc::new(MockPoolApi::new(10));
        let client = ready(api.clone()).await.with_detail_batch_size(2);

        let ids: Vec<String> = (0..50).map(|i| format!("pool-{}", i)).collect();
        let details = client.fetch_details(&ids).await;

        assert_eq!(details.len(), 50);
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 25);
        let max_in_flight = api.max_in_flight.load(Ordering::SeqCst);
        assert!(max_in_flight > 1, "batches ran one at a time");
        assert!(max_in_flight <= MAX_CONCURRENT_DETAIL_REQUESTS);
    }
}
