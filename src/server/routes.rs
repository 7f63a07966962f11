// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    batch_handler, clear_handler, health_handler, metrics_handler, monitored_rag_handler,
    stats_handler,
};
use super::middleware::{request_id_layers, track_metrics};
use crate::config::AppConfig;
use crate::pipeline::RagService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<RagService>,
}

pub fn create_router(config: AppConfig, service: Arc<RagService>) -> Router {
    crate::metrics::init();
    let enable_compression = config.server.enable_compression;
    let state = AppState {
        config: Arc::new(config),
        service,
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/monitored-rag",
            post(monitored_rag_handler)
                .get(stats_handler)
                .delete(clear_handler),
        )
        .route("/api/monitored-rag/batch", post(batch_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    if enable_compression {
        app = app.layer(CompressionLayer::new());
    }

    app.layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
