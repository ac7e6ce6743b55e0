//! GraphQL response cache storage
//!
//! Cached responses are keyed by channel so two storefronts asking the same
//! query never share a response.

mod memory;
mod redis_store;

pub use memory::{CacheStats, InMemoryResponseStore, DEFAULT_MAX_BYTES};
pub use redis_store::RedisResponseStore;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Key segment used when no channel was resolved for the request
pub const NO_CHANNEL_KEY: &str = "default";

/// Backend storing serialized GraphQL responses
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, body: Vec<u8>, ttl: Duration) -> CacheResult<()>;
}

/// Build the cache key for a request body under a channel
pub fn cache_key(channel_code: Option<&str>, body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!(
        "graphql:{}:{}",
        channel_code.unwrap_or(NO_CHANNEL_KEY),
        hex::encode(digest)
    )
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
