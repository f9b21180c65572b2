//! HTTP API server for the product catalog.
//!
//! Provides REST endpoints for product management on top of the request
//! dispatcher, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use application::{DispatchError, integration_event_bus, product_dispatcher};
use axum::Router;
use axum::routing::get;
use messaging::MessagePublisher;
use metrics_exporter_prometheus::PrometheusHandle;
use product_store::ProductRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::products::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/api/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the dispatcher over the given ports.
///
/// Every product event is forwarded to `publisher` on `exchange`.
pub fn create_state(
    repository: Arc<dyn ProductRepository>,
    publisher: Arc<dyn MessagePublisher>,
    exchange: &str,
    request_timeout: Duration,
) -> Result<Arc<AppState>, DispatchError> {
    let events = integration_event_bus(publisher, exchange);
    let dispatcher = product_dispatcher(repository, Arc::new(events))?;

    Ok(Arc::new(AppState {
        dispatcher,
        request_timeout,
    }))
}
