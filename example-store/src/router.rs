use std::{future::ready, sync::Arc, time::Duration};

use axum::{
    http::{Method, StatusCode},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    api::{
        endpoints::{create_example, get_example_by_id, get_examples},
        errors::handle_panic,
    },
    metrics::utils::track_metrics,
    service::ExampleStoreService,
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ExampleStoreService + Send + Sync>,
}

pub fn router(
    service: Arc<dyn ExampleStoreService + Send + Sync>,
    request_timeout: Duration,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let state = AppState { service };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request());

    let status_router = Router::new()
        .route("/health", get(|| ready(StatusCode::OK)))
        .route("/_readiness", get(|| ready(StatusCode::OK)))
        .route("/_liveness", get(|| ready(StatusCode::OK)));

    let examples_router = Router::new()
        .route(
            "/private/v1/examples",
            get(get_examples).post(create_example),
        )
        .route(
            "/private/v1/examples/",
            get(get_examples).post(create_example),
        )
        .route("/private/v1/examples/:id", get(get_example_by_id));

    let router = Router::new()
        .merge(status_router)
        .merge(examples_router)
        .layer(CatchPanicLayer::custom(handle_panic))
        // A timed-out request drops the handler future, which cancels its store and cache calls
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .layer(cors)
        .with_state(state);

    match metrics {
        Some(recorder_handle) => {
            router.route("/metrics", get(move || ready(recorder_handle.render())))
        }
        None => router,
    }
}
