use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use common_database::{get_pool, PostgresClient};
use common_redis::RedisClient;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::{
    cache_keys::CacheKeySchema,
    config::Config,
    metrics::utils::setup_metrics_recorder,
    service::{CachedExampleService, ExampleStoreService},
    store::{run_migrations, PostgresExampleStore},
};

#[derive(Clone)]
pub struct State {
    pub service: Arc<dyn ExampleStoreService + Send + Sync>,
    pub request_timeout: Duration,
    pub metrics: Option<PrometheusHandle>,
}

impl State {
    pub fn new(
        service: Arc<dyn ExampleStoreService + Send + Sync>,
        request_timeout: Duration,
    ) -> Self {
        State {
            service,
            request_timeout,
            metrics: None,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.cache_ttl_seconds == 0 {
            bail!("CACHE_TTL_SECONDS must be greater than zero");
        }
        if config.request_timeout_ms == 0 {
            bail!("REQUEST_TIMEOUT_MS must be greater than zero");
        }

        let pool = match get_pool(&config.database_url, config.max_pg_connections).await {
            Ok(pool) => {
                tracing::info!("Successfully created Postgres client");
                pool
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    max_connections = config.max_pg_connections,
                    "Failed to create Postgres client"
                );
                return Err(anyhow::anyhow!("Failed to create Postgres client: {}", e));
            }
        };

        if config.run_migrations {
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let redis_client = match RedisClient::with_config(
            config.redis_url.clone(),
            Some(config.redis_response_timeout()),
            Some(config.redis_connection_timeout()),
        )
        .await
        {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!("Failed to create Redis client: {}", e);
                return Err(anyhow::anyhow!("Failed to create Redis client: {}", e));
            }
        };

        let postgres_client: PostgresClient = Arc::new(pool);
        let service = CachedExampleService::new(
            Arc::new(PostgresExampleStore::new(postgres_client)),
            redis_client,
            CacheKeySchema::new(config.cache_namespace.clone()),
            config.cache_ttl(),
        )
        .with_cache_timeout(config.redis_response_timeout());

        let metrics = if config.enable_metrics {
            Some(setup_metrics_recorder().context("Failed to install metrics recorder")?)
        } else {
            None
        };

        Ok(State {
            service: Arc::new(service),
            request_timeout: config.request_timeout(),
            metrics,
        })
    }
}
