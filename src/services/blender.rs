use serde::{Deserialize, Serialize};

use crate::models::{ClassificationDecision, LeadStatus, LlmVerdict, RuleScoreResult};

/// Blend weights and the status threshold table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BlendPolicy {
    pub rule_weight: f64,
    pub llm_weight: f64,
    pub lead_at: u8,
    pub potential_at: u8,
    pub no_lead_below: u8,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            rule_weight: 0.55,
            llm_weight: 0.45,
            lead_at: 80,
            potential_at: 58,
            no_lead_below: 25,
        }
    }
}

impl BlendPolicy {
    pub fn with_weights(rule_weight: f64, llm_weight: f64) -> Self {
        Self {
            rule_weight,
            llm_weight,
            ..Self::default()
        }
    }

    /// Weighted mean of the two scores. Falls back to the rule score when the
    /// weights cannot form a mean.
    pub fn blend_scores(&self, rule_score: u8, llm_score: i64) -> u8 {
        let wr = self.rule_weight.max(0.0);
        let wl = self.llm_weight.max(0.0);
        let total = wr + wl;
        if !total.is_finite() || total <= 0.0 {
            return rule_score;
        }
        let llm = llm_score.clamp(0, 100) as f64;
        let blended = (wr * rule_score as f64 + wl * llm) / total;
        blended.round().clamp(0.0, 100.0) as u8
    }

    pub fn status_for(&self, score: u8, rules: &RuleScoreResult) -> LeadStatus {
        if rules.vendor_signal {
            LeadStatus::NoLead
        } else if score >= self.lead_at {
            LeadStatus::Lead
        } else if rules.uncertain || score >= self.potential_at {
            LeadStatus::Potential
        } else if score < self.no_lead_below {
            LeadStatus::NoLead
        } else {
            LeadStatus::FollowUp
        }
    }
}

/// Final decision from the rule result and an optional LLM verdict. Without
/// a verdict the rule score stands alone.
pub fn blend(
    policy: &BlendPolicy,
    rules: &RuleScoreResult,
    llm: Option<&LlmVerdict>,
) -> ClassificationDecision {
    let score = match llm {
        Some(v) => policy.blend_scores(rules.score, v.score),
        None => rules.score,
    };
    let status = policy.status_for(score, rules);

    tracing::info!(
        rules_score = rules.score,
        score,
        status = status.as_str(),
        llm = llm.is_some(),
        "classified message"
    );

    ClassificationDecision {
        status,
        score,
        llm_reason: llm.map(|v| v.reason.clone()).filter(|r| !r.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedEntities;

    fn rules(score: u8, uncertain: bool, vendor: bool) -> RuleScoreResult {
        RuleScoreResult {
            score,
            reasons: vec![],
            conflicts: vec![],
            is_lead: score >= 80 && !vendor,
            uncertain,
            vendor_signal: vendor,
            extracted: ExtractedEntities::default(),
        }
    }

    fn verdict(score: i64) -> LlmVerdict {
        LlmVerdict {
            score,
            reason: "asks for a showing".to_string(),
        }
    }

    #[test]
    fn test_rules_only_fallback() {
        let d = blend(&BlendPolicy::default(), &rules(85, false, false), None);
        assert_eq!(d.status, LeadStatus::Lead);
        assert_eq!(d.score, 85);
        assert!(d.llm_reason.is_none());
    }

    #[test]
    fn test_weighted_blend() {
        let policy = BlendPolicy::default();
        // 0.55 * 60 + 0.45 * 100 = 78
        let d = blend(&policy, &rules(60, false, false), Some(&verdict(100)));
        assert_eq!(d.score, 78);
        assert_eq!(d.status, LeadStatus::Potential);
        assert_eq!(d.llm_reason.as_deref(), Some("asks for a showing"));
    }

    #[test]
    fn test_llm_score_is_clamped() {
        let policy = BlendPolicy::default();
        assert_eq!(policy.blend_scores(100, 5_000), 100);
        assert_eq!(policy.blend_scores(0, -40), 0);
    }

    #[test]
    fn test_degenerate_weights_use_rule_score() {
        let policy = BlendPolicy::with_weights(0.0, 0.0);
        assert_eq!(policy.blend_scores(42, 90), 42);
    }

    #[test]
    fn test_vendor_is_no_lead_regardless_of_score() {
        let d = blend(&BlendPolicy::default(), &rules(90, true, true), Some(&verdict(95)));
        assert_eq!(d.status, LeadStatus::NoLead);
    }

    #[test]
    fn test_status_table() {
        let policy = BlendPolicy::default();
        assert_eq!(policy.status_for(80, &rules(80, false, false)), LeadStatus::Lead);
        assert_eq!(policy.status_for(60, &rules(60, true, false)), LeadStatus::Potential);
        assert_eq!(policy.status_for(20, &rules(20, true, false)), LeadStatus::Potential);
        assert_eq!(policy.status_for(40, &rules(40, false, false)), LeadStatus::FollowUp);
        assert_eq!(policy.status_for(10, &rules(10, false, false)), LeadStatus::NoLead);
    }

    #[test]
    fn test_empty_llm_reason_is_dropped() {
        let v = LlmVerdict {
            score: 50,
            reason: String::new(),
        };
        let d = blend(&BlendPolicy::default(), &rules(50, false, false), Some(&v));
        assert!(d.llm_reason.is_none());
    }
}
