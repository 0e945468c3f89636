use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common_redis::{Client as RedisClient, CustomRedisError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    cache_keys::CacheKeySchema,
    metrics::{
        consts::{CACHE_ERRORS_COUNTER, CACHE_HITS_COUNTER, CACHE_MISSES_COUNTER},
        utils::{inc, label},
    },
    models::Example,
    store::{ExampleStore, StoreError},
};

#[derive(Error, Debug)]
pub enum ExampleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a caller can do about an error, independent of where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InternalFailure,
}

impl ExampleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExampleError::InvalidInput(_) => ErrorKind::InvalidInput,
            ExampleError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            ExampleError::Store(_) => ErrorKind::InternalFailure,
        }
    }
}

#[async_trait]
pub trait ExampleStoreService {
    async fn create_example(&self, description: &str) -> Result<Example, ExampleError>;
    async fn get_example_by_id(&self, id: &str) -> Result<Example, ExampleError>;
    async fn fetch_examples(&self) -> Result<Vec<Example>, ExampleError>;
}

/// Cache-aside reads over an `ExampleStore`.
///
/// Reads try the cache first and fall back to the store on a miss, a cache failure or an
/// unreadable payload, then repopulate the cache. Cache trouble is logged and counted but
/// never returned; store errors are returned as they are. Creating an example drops the
/// cached collection so the next listing goes to the store.
pub struct CachedExampleService {
    store: Arc<dyn ExampleStore + Send + Sync>,
    cache: Arc<dyn RedisClient + Send + Sync>,
    keys: CacheKeySchema,
    ttl_seconds: u64,
    cache_timeout: Option<Duration>,
}

/// Redis expiries are whole seconds and must be positive, so partial seconds round up.
fn expiry_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    seconds.max(1)
}

impl CachedExampleService {
    pub fn new(
        store: Arc<dyn ExampleStore + Send + Sync>,
        cache: Arc<dyn RedisClient + Send + Sync>,
        keys: CacheKeySchema,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            keys,
            ttl_seconds: expiry_seconds(ttl),
            cache_timeout: None,
        }
    }

    /// Bound every cache call. An expired call counts as a cache failure.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = Some(timeout);
        self
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CustomRedisError>
    where
        F: Future<Output = Result<T, CustomRedisError>>,
    {
        match self.cache_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(CustomRedisError::Timeout)),
            None => call.await,
        }
    }

    /// `None` means the caller has to go to the store.
    async fn read_cached<T: DeserializeOwned>(&self, key: &str, lookup: &str) -> Option<T> {
        match self.bounded(self.cache.get(key.to_string())).await {
            Ok(payload) => match serde_json::from_slice::<T>(&payload) {
                Ok(value) => {
                    tracing::debug!(key, "cache hit");
                    inc(CACHE_HITS_COUNTER, &label("lookup", lookup), 1);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                    inc(CACHE_ERRORS_COUNTER, &label("op", "decode"), 1);
                    None
                }
            },
            Err(e) if e.is_miss() => {
                tracing::debug!(key, "cache miss");
                inc(CACHE_MISSES_COUNTER, &label("lookup", lookup), 1);
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to store");
                inc(CACHE_ERRORS_COUNTER, &label("op", "get"), 1);
                None
            }
        }
    }

    async fn populate<T: Serialize + ?Sized>(&self, key: String, value: &T) {
        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode cache entry");
                inc(CACHE_ERRORS_COUNTER, &label("op", "encode"), 1);
                return;
            }
        };

        if let Err(e) = self
            .bounded(self.cache.setex(key.clone(), payload, self.ttl_seconds))
            .await
        {
            tracing::warn!(key = %key, error = %e, "Failed to populate cache");
            inc(CACHE_ERRORS_COUNTER, &label("op", "setex"), 1);
        }
    }

    async fn invalidate(&self, key: String) {
        if let Err(e) = self.bounded(self.cache.del(key.clone())).await {
            tracing::warn!(key = %key, error = %e, "Failed to invalidate cache entry");
            inc(CACHE_ERRORS_COUNTER, &label("op", "del"), 1);
        }
    }
}

#[async_trait]
impl ExampleStoreService for CachedExampleService {
    #[instrument(skip_all)]
    async fn create_example(&self, description: &str) -> Result<Example, ExampleError> {
        let example = self.store.create_example(description).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create example");
            e
        })?;

        self.invalidate(self.keys.examples()).await;

        Ok(example)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn get_example_by_id(&self, id: &str) -> Result<Example, ExampleError> {
        let key = self.keys.example_by_id(id);

        if let Some(example) = self.read_cached::<Example>(&key, "by_id").await {
            return Ok(example);
        }

        let example = self.store.get_example_by_id(id).await.map_err(|e| {
            if !matches!(e, StoreError::NotFound(_)) {
                tracing::error!(error = %e, "Failed to get example from store");
            }
            e
        })?;

        self.populate(key, &example).await;

        Ok(example)
    }

    #[instrument(skip_all)]
    async fn fetch_examples(&self) -> Result<Vec<Example>, ExampleError> {
        let key = self.keys.examples();

        if let Some(examples) = self.read_cached::<Vec<Example>>(&key, "collection").await {
            return Ok(examples);
        }

        let examples = self.store.get_examples().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get examples from store");
            e
        })?;

        self.populate(key, &examples).await;

        Ok(examples)
    }
}
