use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgPool, PgPoolOptions},
    Error as SqlxError, Postgres,
};
use thiserror::Error;

// Reads and single-row inserts are the only statements this pool runs, so these stay tight.
pub const DEFAULT_TIMEOUTS: DatabaseTimeouts = DatabaseTimeouts {
    statement_timeout: Duration::from_secs(2),
    lock_timeout: Duration::from_millis(500),
    acquire_timeout: Duration::from_secs(1),
    idle_timeout: Duration::from_secs(300),
    max_lifetime: Duration::from_secs(1800),
};

#[derive(Error, Debug)]
pub enum CustomDatabaseError {
    #[error("Pg error: {0}")]
    Other(#[from] sqlx::Error),
}

pub type PostgresClient = Arc<dyn Client + Send + Sync>;

/// A simple db wrapper handing out pooled connections.
///
/// Every connection carries session-level `statement_timeout` and `lock_timeout`,
/// so a query can never block a caller for longer than the configured bounds.
#[async_trait]
pub trait Client {
    async fn get_connection(&self) -> Result<PoolConnection<Postgres>, CustomDatabaseError>;
}

#[derive(Debug, Clone)]
pub struct DatabaseTimeouts {
    pub statement_timeout: Duration,
    pub lock_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

pub async fn get_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    get_pool_with_timeouts(url, max_connections, DEFAULT_TIMEOUTS).await
}

pub async fn get_pool_with_timeouts(
    url: &str,
    max_connections: u32,
    timeouts: DatabaseTimeouts,
) -> Result<PgPool, sqlx::Error> {
    let statement_ms = timeouts.statement_timeout.as_millis();
    let lock_ms = timeouts.lock_timeout.as_millis();

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeouts.acquire_timeout)
        .test_before_acquire(true)
        .idle_timeout(timeouts.idle_timeout)
        .max_lifetime(timeouts.max_lifetime)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // SET does not accept bind parameters
                sqlx::query(&format!("SET statement_timeout = '{statement_ms}ms'"))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{lock_ms}ms'"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(url)
        .await
}

#[async_trait]
impl Client for PgPool {
    async fn get_connection(&self) -> Result<PoolConnection<Postgres>, CustomDatabaseError> {
        let conn = self.acquire().await?;
        Ok(conn)
    }
}

/// Determines if a sqlx::Error represents a timeout-related failure
pub fn is_timeout_error(error: &SqlxError) -> bool {
    match error {
        SqlxError::PoolTimedOut => true,
        SqlxError::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
        SqlxError::Database(db_error) => match db_error.code() {
            // 57014: query_canceled (statement_timeout), 55P03: lock_not_available
            Some(code) => matches!(code.as_ref(), "57014" | "55P03"),
            None => db_error.message().to_lowercase().contains("timeout"),
        },
        _ => false,
    }
}

/// Determines if a sqlx::Error means the database could not be reached at all,
/// as opposed to a query that reached it and failed.
pub fn is_unavailable_error(error: &SqlxError) -> bool {
    matches!(
        error,
        SqlxError::Io(_) | SqlxError::Tls(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed
    )
}

/// Determines if a sqlx::Error is a unique constraint violation (SQLSTATE 23505)
pub fn is_unique_violation_error(error: &SqlxError) -> bool {
    match error {
        SqlxError::Database(db_error) => db_error.code().is_some_and(|code| code == "23505"),
        _ => false,
    }
}
