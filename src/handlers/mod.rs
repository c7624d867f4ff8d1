pub mod health;
pub mod triage;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/classify", post(triage::classify))
        .route("/api/schedule", post(triage::schedule))
        .route("/api/triage", post(triage::process))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
