use serde::{Deserialize, Serialize};

use super::entities::ExtractedEntities;

/// Output of the deterministic rule layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleScoreResult {
    #[serde(rename = "rulesScore")]
    pub score: u8,
    pub reasons: Vec<String>,
    pub conflicts: Vec<String>,
    pub is_lead: bool,
    #[serde(rename = "uncertainty")]
    pub uncertain: bool,
    pub vendor_signal: bool,
    pub extracted: ExtractedEntities,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Lead,
    Potential,
    NoLead,
    FollowUp,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Lead => "lead",
            LeadStatus::Potential => "potential",
            LeadStatus::NoLead => "no_lead",
            LeadStatus::FollowUp => "follow_up",
        }
    }

    /// Whether a scheduling reply is worth drafting for this status.
    pub fn wants_scheduling(&self) -> bool {
        matches!(self, LeadStatus::Lead | LeadStatus::Potential)
    }
}

/// Score and reason returned by the LLM classification collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmVerdict {
    pub score: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDecision {
    pub status: LeadStatus,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_reason: Option<String>,
}

/// Rule layer and blended decision for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReport {
    #[serde(flatten)]
    pub rules: RuleScoreResult,
    pub decision: ClassificationDecision,
}
