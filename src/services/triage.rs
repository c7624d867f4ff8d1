use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::timeout;

use crate::errors::AppError;
use crate::models::{
    BusyInterval, ComposedReply, InboundMessage, LlmVerdict, ProposedWindow, RuleScoreResult,
    SchedulingExtraction, SchedulingPreferences, ScoringRules, TriageReport,
};
use crate::services::ai::classify::classify_with_llm;
use crate::services::ai::scheduling::extract_scheduling;
use crate::services::ai::LlmProvider;
use crate::services::availability::AvailabilityResolver;
use crate::services::blender::{blend, BlendPolicy};
use crate::services::draft::compose_draft;
use crate::services::scorer::score_message;
use crate::services::slots::{propose_windows, HORIZON_DAYS};

/// Classification and scheduling pipeline. Holds configuration only; every
/// run is independent.
#[derive(Clone)]
pub struct Triage {
    rules: ScoringRules,
    policy: BlendPolicy,
    llm: Option<Arc<dyn LlmProvider>>,
    llm_timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageOutcome {
    pub report: TriageReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ComposedReply>,
}

impl Default for Triage {
    fn default() -> Self {
        Self::new(ScoringRules::default(), BlendPolicy::default())
    }
}

impl Triage {
    pub fn new(rules: ScoringRules, policy: BlendPolicy) -> Self {
        Self {
            rules,
            policy,
            llm: None,
            llm_timeout: Duration::from_secs(8),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>, llm_timeout: Duration) -> Self {
        self.llm = Some(llm);
        self.llm_timeout = llm_timeout;
        self
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Rule layer only; never suspends.
    pub fn score(&self, msg: &InboundMessage) -> RuleScoreResult {
        score_message(&self.rules, msg)
    }

    pub async fn classify(&self, msg: &InboundMessage) -> TriageReport {
        let rules = self.score(msg);
        let verdict = self.llm_verdict(msg).await;
        let decision = blend(&self.policy, &rules, verdict.as_ref());
        TriageReport { rules, decision }
    }

    /// Proposes windows and drafts the reply. Busy lookup and the LLM
    /// extraction run concurrently; windows only wait on the busy lookup.
    pub async fn schedule(
        &self,
        subject: &str,
        body: &str,
        prefs: &SchedulingPreferences,
        resolver: &dyn AvailabilityResolver,
        now: DateTime<Utc>,
    ) -> Result<ComposedReply, AppError> {
        let tz = prefs.validate()?;

        let proposal = async {
            let busy = self.busy(resolver, now).await;
            propose_windows(prefs, &busy, now)
        };
        let (windows, extraction) = tokio::join!(proposal, self.llm_extraction(subject, body));
        let proposed_windows: Vec<ProposedWindow> = windows?;

        let body_text = compose_draft(
            &proposed_windows,
            extraction.detected_property.as_deref(),
            &tz,
        );

        tracing::info!(
            proposed = proposed_windows.len(),
            requested = extraction.requested_windows.len(),
            property = extraction.detected_property.is_some(),
            "composed scheduling reply"
        );

        Ok(ComposedReply {
            detected_property: extraction.detected_property,
            requested_windows: extraction.requested_windows,
            proposed_windows,
            body_text,
        })
    }

    /// Classifies, then drafts a reply when the status calls for scheduling.
    pub async fn process(
        &self,
        msg: &InboundMessage,
        prefs: &SchedulingPreferences,
        resolver: &dyn AvailabilityResolver,
        now: DateTime<Utc>,
    ) -> Result<TriageOutcome, AppError> {
        let report = self.classify(msg).await;
        let reply = if report.decision.status.wants_scheduling() {
            Some(
                self.schedule(&msg.subject, &msg.body_text, prefs, resolver, now)
                    .await?,
            )
        } else {
            None
        };
        Ok(TriageOutcome { report, reply })
    }

    async fn llm_verdict(&self, msg: &InboundMessage) -> Option<LlmVerdict> {
        let llm = self.llm.as_deref()?;
        let call = classify_with_llm(llm, &msg.subject, &msg.body_text);
        match timeout(self.llm_timeout, call).await {
            Ok(Ok(parsed)) => {
                if parsed.is_fallback() {
                    tracing::debug!("LLM verdict replaced by fallback");
                }
                parsed.into_inner()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "LLM classification failed, using rules only");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.llm_timeout.as_millis() as u64,
                    "LLM classification timed out, using rules only"
                );
                None
            }
        }
    }

    async fn llm_extraction(&self, subject: &str, body: &str) -> SchedulingExtraction {
        let Some(llm) = self.llm.as_deref() else {
            return SchedulingExtraction::default();
        };
        match timeout(self.llm_timeout, extract_scheduling(llm, subject, body)).await {
            Ok(Ok(parsed)) => {
                if parsed.is_fallback() {
                    tracing::debug!("LLM scheduling extraction unusable, no advisory windows");
                }
                parsed.into_inner()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "LLM scheduling extraction failed");
                SchedulingExtraction::default()
            }
            Err(_) => {
                tracing::warn!("LLM scheduling extraction timed out");
                SchedulingExtraction::default()
            }
        }
    }

    async fn busy(&self, resolver: &dyn AvailabilityResolver, now: DateTime<Utc>) -> Vec<BusyInterval> {
        let time_max = now + chrono::Duration::days(HORIZON_DAYS as i64 + 1);
        match resolver.busy_between(now, time_max).await {
            Ok(busy) => busy,
            Err(e) => {
                tracing::warn!(error = %e, "no busy data available, treating calendar as free");
                Vec::new()
            }
        }
    }
}
