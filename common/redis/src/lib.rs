use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CustomRedisError {
    #[error("Not found in redis")]
    NotFound,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Timeout error")]
    Timeout,
    #[error(transparent)]
    Redis(#[from] Arc<redis::RedisError>),
}

impl From<redis::RedisError> for CustomRedisError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            CustomRedisError::Timeout
        } else {
            CustomRedisError::Redis(Arc::new(err))
        }
    }
}

impl CustomRedisError {
    /// Create a Redis error from an ErrorKind (primarily for testing)
    pub fn from_redis_kind(kind: redis::ErrorKind, description: &'static str) -> Self {
        CustomRedisError::Redis(Arc::new(redis::RedisError::from((kind, description))))
    }

    /// A miss is the only outcome a caller should treat as "key absent".
    /// Everything else means the cache could not answer.
    pub fn is_miss(&self) -> bool {
        matches!(self, CustomRedisError::NotFound)
    }
}

/// A byte-oriented key/value cache with per-key expiry.
///
/// Values are opaque: callers own the encoding. `get` reports a missing or
/// expired key as `CustomRedisError::NotFound`.
#[async_trait]
pub trait Client {
    async fn get(&self, k: String) -> Result<Vec<u8>, CustomRedisError>;
    async fn setex(&self, k: String, v: Vec<u8>, seconds: u64) -> Result<(), CustomRedisError>;
    async fn del(&self, k: String) -> Result<(), CustomRedisError>;
}

mod client;
mod mock;

pub use client::RedisClient;
pub use mock::{MockRedisCall, MockRedisClient, MockRedisValue};
