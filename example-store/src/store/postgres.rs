use async_trait::async_trait;
use common_database::{is_unique_violation_error, PostgresClient};
use sqlx::PgPool;
use tracing::instrument;

use super::{creation_timestamp, ExampleStore, StoreError};
use crate::{ids::DataPrefix, models::Example};

const EXAMPLE_COLUMNS: &str = "id, description, created_at, updated_at";
const MAX_INSERT_ATTEMPTS: u32 = 3;

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub struct PostgresExampleStore {
    client: PostgresClient,
}

impl PostgresExampleStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExampleStore for PostgresExampleStore {
    #[instrument(skip_all)]
    async fn create_example(&self, description: &str) -> Result<Example, StoreError> {
        let now = creation_timestamp();

        let mut conn = self.client.get_connection().await.map_err(|e| {
            tracing::error!("Failed to get database connection: {}", e);
            StoreError::from(e)
        })?;

        let query = format!(
            "INSERT INTO examples ({EXAMPLE_COLUMNS}) VALUES ($1, $2, $3, $4) RETURNING {EXAMPLE_COLUMNS}"
        );

        let mut attempt = 1;
        loop {
            let id = DataPrefix::Example.generate();
            let result = sqlx::query_as::<_, Example>(&query)
                .bind(&id)
                .bind(description)
                .bind(now)
                .bind(now)
                .fetch_one(&mut *conn)
                .await;

            match result {
                Ok(example) => return Ok(example),
                Err(e) if is_unique_violation_error(&e) && attempt < MAX_INSERT_ATTEMPTS => {
                    tracing::warn!(id = %id, attempt, "Generated id already taken, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, id = %id, "Failed to create example");
                    return Err(StoreError::from(e));
                }
            }
        }
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn get_example_by_id(&self, id: &str) -> Result<Example, StoreError> {
        let mut conn = self.client.get_connection().await.map_err(|e| {
            tracing::error!("Failed to get database connection: {}", e);
            StoreError::from(e)
        })?;

        let query = format!("SELECT {EXAMPLE_COLUMNS} FROM examples WHERE id = $1");
        let row = sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to get example by id");
                StoreError::from(e)
            })?;

        row.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[instrument(skip_all)]
    async fn get_examples(&self) -> Result<Vec<Example>, StoreError> {
        let mut conn = self.client.get_connection().await.map_err(|e| {
            tracing::error!("Failed to get database connection: {}", e);
            StoreError::from(e)
        })?;

        // ids carry a time-ordered token, so this is creation order
        let query = format!("SELECT {EXAMPLE_COLUMNS} FROM examples ORDER BY id");
        sqlx::query_as::<_, Example>(&query)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to get examples");
                StoreError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{random_string, setup_pg_client};

    #[tokio::test]
    #[ignore = "requires a local postgres"]
    async fn test_create_then_get_by_id() {
        let store = PostgresExampleStore::new(setup_pg_client(None).await);
        let description = random_string("description_", 12);

        let created = store.create_example(&description).await.unwrap();
        assert!(DataPrefix::Example.is_valid(&created.id));
        assert_eq!(created.description, description);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_example_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    #[ignore = "requires a local postgres"]
    async fn test_get_unknown_id_is_not_found() {
        let store = PostgresExampleStore::new(setup_pg_client(None).await);
        let id = DataPrefix::Example.generate();

        match store.get_example_by_id(&id).await {
            Err(StoreError::NotFound(missing)) => assert_eq!(missing, id),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore = "requires a local postgres"]
    async fn test_get_examples_includes_new_rows_in_creation_order() {
        let store = PostgresExampleStore::new(setup_pg_client(None).await);

        let first = store.create_example("first").await.unwrap();
        let second = store.create_example("second").await.unwrap();

        let all = store.get_examples().await.unwrap();
        let first_pos = all.iter().position(|e| e.id == first.id).unwrap();
        let second_pos = all.iter().position(|e| e.id == second.id).unwrap();
        assert!(first_pos < second_pos);
    }
}
