use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Client, CustomRedisError};

/// In-memory stand-in for a redis cache.
///
/// Values written with `setex` are visible to later `get`s, and `del` removes
/// them, so read-through flows can be exercised end to end. Errors can be
/// programmed per key and per operation; a programmed error wins over any
/// stored value. TTLs are recorded but never expire entries.
///
/// Clones share state, so a test can hand one clone to the code under test and
/// inspect calls through another.
#[derive(Clone, Default)]
pub struct MockRedisClient {
    values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    get_errors: Arc<Mutex<HashMap<String, CustomRedisError>>>,
    setex_errors: Arc<Mutex<HashMap<String, CustomRedisError>>>,
    del_errors: Arc<Mutex<HashMap<String, CustomRedisError>>>,
    calls: Arc<Mutex<Vec<MockRedisCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRedisValue {
    None,
    BytesWithTTL(Vec<u8>, u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRedisCall {
    pub op: String,
    pub key: String,
    pub value: MockRedisValue,
}

// A poisoned lock only means another test thread panicked mid-call; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockRedisClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program the outcome of `get` for `key`: `Ok` stores the value, `Err` makes every
    /// `get` of that key fail with the error.
    pub fn get_ret(&mut self, key: &str, ret: Result<Vec<u8>, CustomRedisError>) -> Self {
        match ret {
            Ok(value) => {
                lock(&self.get_errors).remove(key);
                lock(&self.values).insert(key.to_owned(), value);
            }
            Err(err) => {
                lock(&self.get_errors).insert(key.to_owned(), err);
            }
        }
        self.clone()
    }

    pub fn setex_ret(&mut self, key: &str, ret: Result<(), CustomRedisError>) -> Self {
        match ret {
            Ok(()) => lock(&self.setex_errors).remove(key),
            Err(err) => lock(&self.setex_errors).insert(key.to_owned(), err),
        };
        self.clone()
    }

    pub fn del_ret(&mut self, key: &str, ret: Result<(), CustomRedisError>) -> Self {
        match ret {
            Ok(()) => lock(&self.del_errors).remove(key),
            Err(err) => lock(&self.del_errors).insert(key.to_owned(), err),
        };
        self.clone()
    }

    /// The value currently held for `key`, bypassing the call log.
    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.values).get(key).cloned()
    }

    pub fn get_calls(&self) -> Vec<MockRedisCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, op: &str) -> Vec<MockRedisCall> {
        self.get_calls()
            .into_iter()
            .filter(|call| call.op == op)
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, op: &str, key: &str, value: MockRedisValue) {
        lock(&self.calls).push(MockRedisCall {
            op: op.to_string(),
            key: key.to_string(),
            value,
        });
    }
}

#[async_trait]
impl Client for MockRedisClient {
    async fn get(&self, key: String) -> Result<Vec<u8>, CustomRedisError> {
        self.record("get", &key, MockRedisValue::None);

        if let Some(err) = lock(&self.get_errors).get(&key) {
            return Err(err.clone());
        }
        lock(&self.values)
            .get(&key)
            .cloned()
            .ok_or(CustomRedisError::NotFound)
    }

    async fn setex(
        &self,
        key: String,
        value: Vec<u8>,
        seconds: u64,
    ) -> Result<(), CustomRedisError> {
        self.record(
            "setex",
            &key,
            MockRedisValue::BytesWithTTL(value.clone(), seconds),
        );

        if let Some(err) = lock(&self.setex_errors).get(&key) {
            return Err(err.clone());
        }
        lock(&self.values).insert(key, value);
        Ok(())
    }

    async fn del(&self, key: String) -> Result<(), CustomRedisError> {
        self.record("del", &key, MockRedisValue::None);

        if let Some(err) = lock(&self.del_errors).get(&key) {
            return Err(err.clone());
        }
        lock(&self.values).remove(&key);
        Ok(())
    }
}
