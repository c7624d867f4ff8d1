use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{BusyInterval, ComposedReply, InboundMessage, SchedulingPreferences, TriageReport};
use crate::services::availability::{parse_freebusy, StaticAvailability};
use crate::services::triage::TriageOutcome;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub from: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ClassifyRequest {
    fn into_message(self) -> InboundMessage {
        let mut msg = InboundMessage {
            subject: self.subject,
            body_text: self.body,
            headers: self.headers,
        };
        if let Some(from) = self.from.filter(|f| !f.trim().is_empty()) {
            msg = msg.with_from(from);
        }
        msg
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub user_prefs: SchedulingPreferences,
    /// Busy spans already fetched by the caller.
    pub calendar_busy: Option<Vec<BusyInterval>>,
    /// Raw provider free/busy payload, used when `calendar_busy` is absent.
    pub free_busy: Option<serde_json::Value>,
}

impl ScheduleRequest {
    fn availability(&self) -> Result<StaticAvailability, AppError> {
        if let Some(busy) = &self.calendar_busy {
            return Ok(StaticAvailability::new(busy.clone()));
        }
        match &self.free_busy {
            Some(payload) => {
                let busy = parse_freebusy(&payload.to_string())
                    .map_err(|e| AppError::Validation(format!("{e:#}")))?;
                Ok(StaticAvailability::new(busy))
            }
            None => Ok(StaticAvailability::default()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(flatten)]
    pub message: ClassifyRequest,
    #[serde(default)]
    pub user_prefs: SchedulingPreferences,
    pub calendar_busy: Option<Vec<BusyInterval>>,
}

// POST /api/classify
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClassifyRequest>,
) -> Json<TriageReport> {
    let msg = payload.into_message();
    Json(state.triage.classify(&msg).await)
}

// POST /api/schedule
pub async fn schedule(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<Json<ComposedReply>, AppError> {
    let resolver = payload.availability()?;
    let reply = state
        .triage
        .schedule(
            &payload.subject,
            &payload.body,
            &payload.user_prefs,
            &resolver,
            Utc::now(),
        )
        .await?;
    Ok(Json(reply))
}

// POST /api/triage
pub async fn process(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProcessRequest>,
) -> Result<Json<TriageOutcome>, AppError> {
    let resolver = StaticAvailability::new(payload.calendar_busy.unwrap_or_default());
    let prefs = payload.user_prefs;
    let msg = payload.message.into_message();
    let outcome = state
        .triage
        .process(&msg, &prefs, &resolver, Utc::now())
        .await?;
    Ok(Json(outcome))
}
