//! In-memory `PoolApi` used by the registry client and monitor tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::api_types::{PoolDetailsPayload, PoolListPage};
use super::PoolApi;
use crate::shared::errors::RegistryError;

pub const WSOL: &str = "So11111111111111111111111111111111111111112";
pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Simulated detail round trip, long enough for concurrent batches to overlap
const DETAIL_LATENCY: Duration = Duration::from_millis(10);

/// Standard v3 listing entry with the given circulating supply
pub fn pool_json(id: &str, supply: f64) -> Value {
    json!({
        "id": id,
        "type": "Standard",
        "mintA": { "address": USDC, "decimals": 6, "symbol": "MEME" },
        "mintB": { "address": WSOL, "decimals": 9, "symbol": "WSOL" },
        "lpMint": { "address": "8HoQnePLqPj4M7PUDzfw8e3Ymdwgc7NLGnaTUapubyvu", "decimals": 9 },
        "mintAmountA": supply
    })
}

pub struct MockPoolApi {
    page_size: usize,
    endless: bool,
    listing: Mutex<Vec<Value>>,
    details: Mutex<HashMap<String, Value>>,
    connect_error: Option<RegistryError>,
    invalid_page: Option<u32>,
    slow_page: Option<(u32, Duration)>,
    page_errors: Mutex<VecDeque<RegistryError>>,
    detail_errors: Mutex<VecDeque<RegistryError>>,
    in_flight: AtomicUsize,
    pub connect_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockPoolApi {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            endless: false,
            listing: Mutex::new(Vec::new()),
            details: Mutex::new(HashMap::new()),
            connect_error: None,
            invalid_page: None,
            slow_page: None,
            page_errors: Mutex::new(VecDeque::new()),
            detail_errors: Mutex::new(VecDeque::new()),
            in_flight: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_pools(self, pools: Vec<Value>) -> Self {
        *self.listing.lock().unwrap() = pools;
        self
    }

    /// Every page is full and reports a next page
    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn invalid_page(mut self, page: u32) -> Self {
        self.invalid_page = Some(page);
        self
    }

    pub fn slow_page(mut self, page: u32, delay: Duration) -> Self {
        self.slow_page = Some((page, delay));
        self
    }

    pub fn with_detail(self, id: &str, detail: Value) -> Self {
        self.details.lock().unwrap().insert(id.to_string(), detail);
        self
    }

    pub fn failing_connect(mut self, err: RegistryError) -> Self {
        self.connect_error = Some(err);
        self
    }

    pub fn push_page_error(&self, err: RegistryError) {
        self.page_errors.lock().unwrap().push_back(err);
    }

    pub fn push_detail_error(&self, err: RegistryError) {
        self.detail_errors.lock().unwrap().push_back(err);
    }

    /// Replaces the listing served from now on
    pub fn set_listing(&self, pools: Vec<Value>) {
        *self.listing.lock().unwrap() = pools;
    }

    pub fn set_detail(&self, id: &str, detail: Value) {
        self.details.lock().unwrap().insert(id.to_string(), detail);
    }

    fn page_payload(&self, page: u32) -> Value {
        let start = (page as usize - 1) * self.page_size;

        if self.endless {
            let pools: Vec<Value> = (0..self.page_size)
                .map(|i| pool_json(&format!("pool-{}", start + i), 1.0))
                .collect();
            return json!({ "count": pools.len(), "hasNextPage": true, "data": pools });
        }

        let listing = self.listing.lock().unwrap();
        let end = (start + self.page_size).min(listing.len());
        let pools: Vec<Value> = listing.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();
        json!({ "count": listing.len(), "hasNextPage": end < listing.len(), "data": pools })
    }
}

#[async_trait]
impl PoolApi for MockPoolApi {
    async fn connect(&self) -> Result<(), RegistryError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match &self.connect_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_pool_page(&self, page: u32) -> Result<PoolListPage, RegistryError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);

        let queued = self.page_errors.lock().unwrap().pop_front();
        if let Some(err) = queued {
            return Err(err);
        }
        if let Some((slow, delay)) = self.slow_page {
            if slow == page {
                tokio::time::sleep(delay).await;
            }
        }
        if self.invalid_page == Some(page) {
            return Ok(PoolListPage::from_value(json!({ "data": null, "hasNextPage": true })));
        }

        Ok(PoolListPage::from_value(self.page_payload(page)))
    }

    async fn fetch_pool_details(&self, ids: &[String]) -> Result<PoolDetailsPayload, RegistryError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(DETAIL_LATENCY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let queued = self.detail_errors.lock().unwrap().pop_front();
        if let Some(err) = queued {
            return Err(err);
        }

        let details = self.details.lock().unwrap();
        let entries: Vec<Value> = ids
            .iter()
            .map(|id| details.get(id).cloned().unwrap_or(Value::Null))
            .collect();
        Ok(PoolDetailsPayload::List(entries))
    }
}
