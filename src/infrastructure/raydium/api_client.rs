use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::{debug, info};

use super::api_types::{ApiEnvelope, PoolDetailsPayload, PoolListPage};
use super::PoolApi;
use crate::shared::errors::RegistryError;

/// Default Raydium v3 API host
pub const DEFAULT_API_URL: &str = "https://api-v3.raydium.io";

/// Per-request HTTP timeout; the page-level deadline is enforced by the registry client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Raydium v3 REST client
pub struct RaydiumApiClient {
    http_client: Client,
    base_url: String,
    rpc_endpoint: String,
    page_size: u32,
}

impl RaydiumApiClient {
    pub fn new(
        base_url: impl Into<String>,
        rpc_endpoint: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, RegistryError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("poolscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Initialization(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rpc_endpoint: rpc_endpoint.into(),
            page_size: page_size.max(1),
        })
    }

    async fn get_envelope(&self, url: &str) -> Result<ApiEnvelope, RegistryError> {
        debug!(url, "Raydium API request");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::from_status(status.as_u16(), url));
        }

        let envelope: ApiEnvelope = response.json().await?;
        if !envelope.success {
            return Err(RegistryError::InvalidResponse(format!(
                "{} answered success=false: {}",
                url,
                envelope.msg.as_deref().unwrap_or("no message")
            )));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl PoolApi for RaydiumApiClient {
    async fn connect(&self) -> Result<(), RegistryError> {
        let rpc = RpcClient::new(self.rpc_endpoint.clone());
        let version = rpc
            .get_version()
            .await
            .map_err(|e| RegistryError::Connection(format!("RPC {}: {}", self.rpc_endpoint, e)))?;
        info!(rpc = %self.rpc_endpoint, solana_core = %version.solana_core, "Connected to Solana RPC");

        let url = format!("{}/main/version", self.base_url);
        self.get_envelope(&url).await?;
        info!(api = %self.base_url, "Raydium API is available");
        Ok(())
    }

    async fn fetch_pool_page(&self, page: u32) -> Result<PoolListPage, RegistryError> {
        let url = format!(
            "{}/pools/info/list?poolType=all&poolSortField=default&sortType=desc&pageSize={}&page={}",
            self.base_url, self.page_size, page
        );
        let envelope = self.get_envelope(&url).await?;
        Ok(PoolListPage::from_value(envelope.data))
    }

    async fn fetch_pool_details(&self, ids: &[String]) -> Result<PoolDetailsPayload, RegistryError> {
        let url = format!("{}/pools/info/ids?ids={}", self.base_url, ids.join(","));
        let envelope = self.get_envelope(&url).await?;
        PoolDetailsPayload::from_value(envelope.data).ok_or_else(|| {
            RegistryError::InvalidResponse("pool details payload is neither a list nor a map".to_string())
        })
    }
}
