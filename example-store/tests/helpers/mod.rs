use std::{
    net::SocketAddr,
    sync::{Arc, Once},
    time::Duration,
};

use common_redis::MockRedisClient;
use example_store::{
    cache_keys::CacheKeySchema,
    server::serve,
    service::CachedExampleService,
    state::State,
    store::MockExampleStore,
};
use tokio::{net::TcpListener, sync::Notify};

static TRACING_INIT: Once = Once::new();
pub fn setup_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_writer(tracing_subscriber::fmt::TestWriter::new())
            .init()
    });
}

pub const TEST_NAMESPACE: &str = "test";
pub const TEST_TTL: Duration = Duration::from_secs(60);

pub struct ServerHandle {
    pub addr: SocketAddr,
    pub shutdown: Arc<Notify>,
}

impl ServerHandle {
    pub async fn for_state(state: State) -> Self {
        setup_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notify = Arc::new(Notify::new());
        let shutdown = notify.clone();

        tokio::spawn(async move {
            serve(state, listener, async move { notify.notified().await })
                .await
                .unwrap()
        });

        Self { addr, shutdown }
    }

    /// Real router and orchestrator over in-memory doubles.
    pub async fn for_doubles(store: &MockExampleStore, cache: &MockRedisClient) -> Self {
        Self::for_doubles_with_timeout(store, cache, Duration::from_secs(5)).await
    }

    pub async fn for_doubles_with_timeout(
        store: &MockExampleStore,
        cache: &MockRedisClient,
        request_timeout: Duration,
    ) -> Self {
        let service = CachedExampleService::new(
            Arc::new(store.clone()),
            Arc::new(cache.clone()),
            CacheKeySchema::new(TEST_NAMESPACE),
            TEST_TTL,
        );
        Self::for_state(State::new(Arc::new(service), request_timeout)).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.notify_one()
    }
}
