//! Run against local services with `cargo test -- --ignored`.

use std::sync::Arc;

use anyhow::Result;
use example_store::{
    cache_keys::CacheKeySchema,
    config::Config,
    service::{CachedExampleService, ExampleStoreService},
    state::State,
    store::PostgresExampleStore,
    utils::test_utils::{random_string, setup_pg_client, setup_redis_client, DEFAULT_TEST_CONFIG},
};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::*;

pub mod helpers;

#[tokio::test]
#[ignore = "requires local postgres and redis"]
async fn should_read_through_redis_and_postgres() -> Result<()> {
    let keys = CacheKeySchema::new(random_string("live-", 8));
    let service = CachedExampleService::new(
        Arc::new(PostgresExampleStore::new(setup_pg_client(None).await)),
        setup_redis_client(None).await,
        keys,
        DEFAULT_TEST_CONFIG.cache_ttl(),
    );

    let created = service.create_example("hello world").await?;
    let first = service.get_example_by_id(&created.id).await?;
    let second = service.get_example_by_id(&created.id).await?;

    assert_eq!(first, created);
    assert_eq!(second, created);
    assert!(service
        .fetch_examples()
        .await?
        .iter()
        .any(|e| e.id == created.id));

    Ok(())
}

#[tokio::test]
#[ignore = "requires local postgres and redis"]
async fn should_serve_requests_from_config() -> Result<()> {
    let config = Config {
        cache_namespace: random_string("live-", 8),
        ..Config::default_for_test()
    };
    let server = ServerHandle::for_state(State::from_config(&config).await?).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/private/v1/examples"))
        .json(&json!({"description": "from config"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    let id = body["data"]["example"]["id"].as_str().unwrap();

    let response = client
        .get(server.url(&format!("/private/v1/examples/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
