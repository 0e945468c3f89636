use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use common_database::{is_timeout_error, is_unavailable_error, CustomDatabaseError};
use thiserror::Error;

use crate::models::Example;

pub mod mock;
pub mod postgres;

pub use mock::{MockExampleStore, MockStoreCall};
pub use postgres::{run_migrations, PostgresExampleStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("example with id {0} not found")]
    NotFound(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("timed out while querying the database")]
    Timeout,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_timeout_error(&err) {
            StoreError::Timeout
        } else if is_unavailable_error(&err) {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

impl From<CustomDatabaseError> for StoreError {
    fn from(err: CustomDatabaseError) -> Self {
        match err {
            CustomDatabaseError::Other(err) => err.into(),
        }
    }
}

/// Durable source of truth for examples. Allocates ids and timestamps on create.
#[async_trait]
pub trait ExampleStore {
    async fn create_example(&self, description: &str) -> Result<Example, StoreError>;

    /// Fails with `StoreError::NotFound` when no row matches.
    async fn get_example_by_id(&self, id: &str) -> Result<Example, StoreError>;

    async fn get_examples(&self) -> Result<Vec<Example>, StoreError>;
}

/// Postgres keeps microseconds, so anything finer would not survive a round trip.
pub(crate) fn creation_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
