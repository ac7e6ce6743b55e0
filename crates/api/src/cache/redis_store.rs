//! Redis-backed response store

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;

use super::{CacheError, CacheResult, ResponseStore};

/// Response store shared across server instances through Redis
#[derive(Clone)]
pub struct RedisResponseStore {
    connection: ConnectionManager,
}

impl RedisResponseStore {
    /// Connect to Redis at `redis_url`
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl ResponseStore for RedisResponseStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut connection = self.connection.clone();
        let body: Option<Vec<u8>> = connection.get(key).await?;
        Ok(body)
    }

    async fn put(&self, key: &str, body: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let mut connection = self.connection.clone();
        connection.set_ex::<_, _, ()>(key, body, seconds).await?;
        Ok(())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}
