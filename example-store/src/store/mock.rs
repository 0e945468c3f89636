use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{creation_timestamp, ExampleStore, StoreError};
use crate::{ids::DataPrefix, models::Example};

/// Builds the error a programmed failure returns. `StoreError` is not `Clone`
/// (it can hold a `sqlx::Error`), so failures are minted fresh on every call.
pub type ErrorFactory = fn() -> StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStoreCall {
    pub op: String,
    pub arg: Option<String>,
}

/// In-memory `ExampleStore` with a call log.
///
/// Rows are kept in insertion order and `get_examples` returns them in that order.
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockExampleStore {
    rows: Arc<Mutex<Vec<Example>>>,
    create_error: Arc<Mutex<Option<ErrorFactory>>>,
    get_errors: Arc<Mutex<HashMap<String, ErrorFactory>>>,
    list_error: Arc<Mutex<Option<ErrorFactory>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<MockStoreCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_example(&mut self, example: Example) -> Self {
        lock(&self.rows).push(example);
        self.clone()
    }

    pub fn create_err(&mut self, err: ErrorFactory) -> Self {
        *lock(&self.create_error) = Some(err);
        self.clone()
    }

    pub fn get_err(&mut self, id: &str, err: ErrorFactory) -> Self {
        lock(&self.get_errors).insert(id.to_owned(), err);
        self.clone()
    }

    pub fn list_err(&mut self, err: ErrorFactory) -> Self {
        *lock(&self.list_error) = Some(err);
        self.clone()
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(&mut self, latency: Duration) -> Self {
        *lock(&self.latency) = Some(latency);
        self.clone()
    }

    pub fn get_calls(&self) -> Vec<MockStoreCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, op: &str) -> Vec<MockStoreCall> {
        self.get_calls()
            .into_iter()
            .filter(|call| call.op == op)
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    async fn record(&self, op: &str, arg: Option<&str>) {
        lock(&self.calls).push(MockStoreCall {
            op: op.to_string(),
            arg: arg.map(str::to_string),
        });

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ExampleStore for MockExampleStore {
    async fn create_example(&self, description: &str) -> Result<Example, StoreError> {
        self.record("create_example", Some(description)).await;

        if let Some(err) = *lock(&self.create_error) {
            return Err(err());
        }

        let now = creation_timestamp();
        let example = Example {
            id: DataPrefix::Example.generate(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).push(example.clone());
        Ok(example)
    }

    async fn get_example_by_id(&self, id: &str) -> Result<Example, StoreError> {
        self.record("get_example_by_id", Some(id)).await;

        if let Some(err) = lock(&self.get_errors).get(id) {
            return Err(err());
        }

        lock(&self.rows)
            .iter()
            .find(|example| example.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn get_examples(&self) -> Result<Vec<Example>, StoreError> {
        self.record("get_examples", None).await;

        if let Some(err) = *lock(&self.list_error) {
            return Err(err());
        }

        Ok(lock(&self.rows).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_allocates_id_and_timestamps() {
        let store = MockExampleStore::new();

        let example = store.create_example("hello").await.unwrap();

        assert!(DataPrefix::Example.is_valid(&example.id));
        assert_eq!(example.created_at, example.updated_at);
        assert_eq!(store.get_example_by_id(&example.id).await.unwrap(), example);
    }

    #[tokio::test]
    async fn test_examples_come_back_in_insertion_order() {
        let store = MockExampleStore::new();
        let a = store.create_example("a").await.unwrap();
        let b = store.create_example("b").await.unwrap();

        assert_eq!(store.get_examples().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_programmed_errors_are_returned_on_every_call() {
        let mut store = MockExampleStore::new();
        store.get_err("exmp_x", || StoreError::Unavailable("down".to_string()));
        store.list_err(|| StoreError::Timeout);
        store.create_err(|| StoreError::Timeout);

        for _ in 0..2 {
            assert!(matches!(
                store.get_example_by_id("exmp_x").await,
                Err(StoreError::Unavailable(_))
            ));
        }
        assert!(matches!(store.get_examples().await, Err(StoreError::Timeout)));
        assert!(matches!(
            store.create_example("x").await,
            Err(StoreError::Timeout)
        ));
        assert_eq!(store.get_calls().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = MockExampleStore::new();

        assert!(matches!(
            store.get_example_by_id("exmp_missing").await,
            Err(StoreError::NotFound(id)) if id == "exmp_missing"
        ));
        assert_eq!(
            store.calls_for("get_example_by_id"),
            vec![MockStoreCall {
                op: "get_example_by_id".to_string(),
                arg: Some("exmp_missing".to_string()),
            }]
        );
    }
}
