use std::sync::Arc;

use chrono::{DateTime, Utc};
use common_database::{get_pool, PostgresClient};
use common_redis::{Client as RedisClientTrait, RedisClient};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};

use crate::{config::Config, models::Example, store::run_migrations};

pub static DEFAULT_TEST_CONFIG: Lazy<Config> = Lazy::new(Config::default_for_test);

pub async fn setup_pg_client(config: Option<&Config>) -> PostgresClient {
    let config = config.unwrap_or(&DEFAULT_TEST_CONFIG);
    let pool = get_pool(&config.database_url, config.max_pg_connections)
        .await
        .expect("Failed to create Postgres client");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(pool)
}

pub async fn setup_redis_client(
    config: Option<&Config>,
) -> Arc<dyn RedisClientTrait + Send + Sync> {
    let config = config.unwrap_or(&DEFAULT_TEST_CONFIG);
    Arc::new(
        RedisClient::new(config.redis_url.clone())
            .await
            .expect("Failed to create Redis client"),
    )
}

pub fn random_string(prefix: &str, length: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

pub fn example_fixture(id: &str, description: &str, at: DateTime<Utc>) -> Example {
    Example {
        id: id.to_string(),
        description: description.to_string(),
        created_at: at,
        updated_at: at,
    }
}
