pub mod errors;
pub mod ops;

use {
    crate::{AppState, adapters::stripe::webhook::wh_handler},
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    std::time::Duration,
    tower_http::{timeout::TimeoutLayer, trace::TraceLayer},
};

pub const MAX_BODY_BYTES: usize = 64 * 1024;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::index))
        .route("/health", get(ops::health))
        .route("/logs", get(ops::logs))
        .route("/webhook", post(wh_handler))
        .route("/test", post(ops::test_payment))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)) // Stripe events are typically <20 KB
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
