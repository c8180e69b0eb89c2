use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use fulfillment_client::{Dispatch, FulfillmentObserver, TracingObserver};
use fulfillment_core::config::{FulfillmentConfig, MAX_BODY_BYTES};

/// Shared state, passed as Arc<AppState> to every handler.
pub struct AppState {
    pub config: FulfillmentConfig,
    /// Handlers run for every webhook request.
    pub dispatch: Dispatch,
    pub observer: Arc<dyn FulfillmentObserver>,
    pub requests_served: AtomicU64,
}

impl AppState {
    pub fn new(config: FulfillmentConfig, dispatch: Dispatch) -> Self {
        let observer = Arc::new(TracingObserver::new(config.observer.trace_payloads));
        Self {
            config,
            dispatch,
            observer,
            requests_served: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Webhook route at the configured path plus `/health`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let path = state.config.gateway.path.clone();
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(&path, post(crate::http::fulfillment::fulfillment_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
