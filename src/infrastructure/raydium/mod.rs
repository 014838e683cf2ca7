//! Raydium v3 pool registry: HTTP transport, wire shapes and the registry client

pub mod api_client;
pub mod api_types;
pub mod normalizer;
pub mod registry_client;

#[cfg(test)]
pub(crate) mod mock;

pub use api_client::RaydiumApiClient;
pub use api_types::{PoolDetailsPayload, PoolListPage, RawPool};
pub use normalizer::normalize_pool;
pub use registry_client::{PoolListing, PoolRegistryClient, UninitializedRegistry};

use std::sync::Arc;

use async_trait::async_trait;

use crate::shared::errors::RegistryError;

/// Transport seam between the registry client and the remote pool API
#[async_trait]
pub trait PoolApi: Send + Sync {
    /// Connection handshake performed once before the client becomes usable
    async fn connect(&self) -> Result<(), RegistryError>;

    /// One page of the pool listing, pages start at 1
    async fn fetch_pool_page(&self, page: u32) -> Result<PoolListPage, RegistryError>;

    /// Detail records for a batch of pool ids, in a single request
    async fn fetch_pool_details(&self, ids: &[String]) -> Result<PoolDetailsPayload, RegistryError>;
}

#[async_trait]
impl<T: PoolApi + ?Sized> PoolApi for Arc<T> {
    async fn connect(&self) -> Result<(), RegistryError> {
        (**self).connect().await
    }

    async fn fetch_pool_page(&self, page: u32) -> Result<PoolListPage, RegistryError> {
        (**self).fetch_pool_page(page).await
    }

    async fn fetch_pool_details(&self, ids: &[String]) -> Result<PoolDetailsPayload, RegistryError> {
        (**self).fetch_pool_details(ids).await
    }
}
