use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "llm": state.triage.has_llm(),
        "llm_provider": state.config.llm_provider,
        "scoring_table": state.triage.rules().version(),
    }))
}
