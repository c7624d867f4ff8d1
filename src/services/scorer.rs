use crate::models::{InboundMessage, RuleScoreResult, ScoringRules};
use crate::services::extractor::extract_entities;

pub const REASON_TOUR: &str = "tour/showing-verb";
pub const REASON_ADDRESS: &str = "address";
pub const REASON_TIME_ASK: &str = "time-ask";
pub const REASON_PRICE: &str = "price";
pub const REASON_PHONE: &str = "phone";
pub const REASON_PORTAL: &str = "portal-domain";
pub const REASON_VENDOR: &str = "vendor/newsletter-signals";
pub const REASON_JOB: &str = "job-pitch-signals";
pub const REASON_RECEIPT: &str = "receipt/notification-signals";
pub const REASON_OVERRIDE: &str = "override:tour+context";

pub const LEAD_THRESHOLD: i32 = 80;
const UNCERTAIN_BAND: std::ops::RangeInclusive<i32> = 58..=62;

/// Deterministic rule score for one message.
///
/// Additive signals first, then penalties, clamp, then the tour override.
/// A vendor hit always disqualifies, even after the override.
pub fn score_message(rules: &ScoringRules, msg: &InboundMessage) -> RuleScoreResult {
    score_parts(rules, &msg.subject, &msg.body_text, msg.from())
}

pub fn score_parts(
    rules: &ScoringRules,
    subject: &str,
    body: &str,
    from: Option<&str>,
) -> RuleScoreResult {
    let w = rules.weights();
    let text = format!("{subject}\n{body}");
    let extracted = extract_entities(rules, subject, body, from);

    let mut score: i32 = 0;
    let mut reasons = Vec::new();

    let tour = rules.tour.is_match(&text);
    let signals = [
        (tour, w.tour_verb, REASON_TOUR),
        (extracted.address.is_some(), w.address, REASON_ADDRESS),
        (extracted.time_ask, w.time_ask, REASON_TIME_ASK),
        (extracted.price.is_some(), w.price, REASON_PRICE),
        (extracted.phone.is_some(), w.phone, REASON_PHONE),
        (extracted.portal.is_some(), w.portal, REASON_PORTAL),
    ];
    for (present, weight, reason) in signals {
        if present {
            score = score.saturating_add(weight);
            reasons.push(reason.to_string());
        }
    }

    // Receipts and automated senders usually reveal themselves in From.
    let sender_text = match from {
        Some(f) => format!("{text}\n{f}"),
        None => text.clone(),
    };

    let vendor = rules.vendor.is_match(&text);
    let penalties = [
        (vendor, w.vendor_penalty, REASON_VENDOR),
        (rules.job.is_match(&text), w.job_pitch_penalty, REASON_JOB),
        (rules.receipt.is_match(&sender_text), w.receipt_penalty, REASON_RECEIPT),
    ];
    for (present, weight, reason) in penalties {
        if present {
            score = score.saturating_sub(weight);
            reasons.push(reason.to_string());
        }
    }

    score = score.clamp(0, 100);

    if tour && extracted.has_context() {
        score = score.max(w.override_floor.clamp(0, 100));
        reasons.push(REASON_OVERRIDE.to_string());
    }

    let mut conflicts = Vec::new();
    if vendor {
        let lead_like = [
            (extracted.phone.is_some(), "vendor+phone"),
            (extracted.time_ask, "vendor+time-ask"),
            (extracted.address.is_some(), "vendor+address"),
            (extracted.price.is_some(), "vendor+price"),
        ];
        conflicts.extend(
            lead_like
                .into_iter()
                .filter(|(present, _)| *present)
                .map(|(_, tag)| tag.to_string()),
        );
    }

    let is_lead = score >= LEAD_THRESHOLD && !vendor;
    let uncertain = !conflicts.is_empty() || UNCERTAIN_BAND.contains(&score);

    if !conflicts.is_empty() {
        tracing::debug!(conflicts = ?conflicts, "vendor signals alongside lead signals");
    }

    RuleScoreResult {
        score: score as u8,
        reasons,
        conflicts,
        is_lead,
        uncertain,
        vendor_signal: vendor,
        extracted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(subject: &str, body: &str) -> RuleScoreResult {
        score_parts(&ScoringRules::default(), subject, body, None)
    }

    #[test]
    fn test_tour_request_scenario() {
        let r = score(
            "Tour request",
            "Can we see 220 SE 2nd St tomorrow? Call me at 305-555-1212",
        );
        assert!(r.score >= 85, "got {}", r.score);
        assert!(r.is_lead);
        assert!(r.reasons.contains(&REASON_OVERRIDE.to_string()));
        assert_eq!(r.extracted.phone.as_deref(), Some("+1-305-555-1212"));
        assert!(r.conflicts.is_empty());
        assert!(!r.uncertain);
    }

    #[test]
    fn test_newsletter_scenario() {
        let r = score("Newsletter September", "Unsubscribe here. Latest vendor updates...");
        assert!(!r.is_lead);
        assert!(r.vendor_signal);
        assert_eq!(r.score, 0);
        assert!(r.reasons.contains(&REASON_VENDOR.to_string()));
    }

    #[test]
    fn test_short_tour_ask_gets_override() {
        let r = score("", "Can we tour this Saturday?");
        assert_eq!(r.score, 85);
        assert!(r.is_lead);
        assert_eq!(r.reasons.last().map(String::as_str), Some(REASON_OVERRIDE));
    }

    #[test]
    fn test_vendor_disqualifies_even_after_override() {
        let r = score(
            "Open house promo",
            "Tour 12 Oak Ln this weekend, call 305-555-1212. Unsubscribe anytime.",
        );
        assert!(r.score >= 85);
        assert!(!r.is_lead);
        assert!(r.uncertain);
        assert!(r.conflicts.contains(&"vendor+phone".to_string()));
        assert!(r.conflicts.contains(&"vendor+address".to_string()));
    }

    #[test]
    fn test_job_pitch_and_receipt_penalties() {
        let r = score("Application for the open position", "Attached is my resume.");
        assert!(r.reasons.contains(&REASON_JOB.to_string()));
        assert_eq!(r.score, 0);

        let rules = ScoringRules::default();
        let r = score_parts(&rules, "Your payment", "Thanks!", Some("noreply@bank.com"));
        assert!(r.reasons.contains(&REASON_RECEIPT.to_string()));
        assert!(!r.is_lead);
    }

    #[test]
    fn test_portal_domain_adds_weight() {
        let rules = ScoringRules::default();
        let r = score_parts(
            &rules,
            "New contact",
            "I'm interested. 305-555-1212",
            Some("Zillow <leads@zillow.com>"),
        );
        assert!(r.reasons.contains(&REASON_PORTAL.to_string()));
        assert_eq!(r.score, 30);
        assert!(!r.is_lead);
    }

    #[test]
    fn test_uncertain_band() {
        // portal 15 + phone 15 + price 10 + address 10 + time-ask 10 = 60
        let rules = ScoringRules::default();
        let r = score_parts(
            &rules,
            "Inquiry",
            "Is 12 Oak Ln still $450,000? Free tomorrow, 305-555-1212",
            Some("leads@redfin.com"),
        );
        assert_eq!(r.score, 60);
        assert!(r.uncertain);
        assert!(!r.is_lead);
    }

    #[test]
    fn test_empty_message() {
        let r = score("", "");
        assert_eq!(r.score, 0);
        assert!(r.reasons.is_empty());
        assert!(!r.is_lead);
        assert!(!r.uncertain);
    }

    #[test]
    fn test_same_input_same_result() {
        let a = score("Showing?", "Price $600k at 4 Elm Ct, text 305.555.1212");
        let b = score("Showing?", "Price $600k at 4 Elm Ct, text 305.555.1212");
        assert_eq!(a, b);
    }

    #[test]
    fn test_extreme_weights_saturate() {
        use crate::models::{ScoringTable, SignalWeights};

        let heavy = ScoringTable {
            weights: SignalWeights {
                tour_verb: i32::MAX,
                phone: i32::MAX,
                vendor_penalty: i32::MAX,
                ..SignalWeights::default()
            },
            ..ScoringTable::default()
        }
        .compile()
        .unwrap();

        let r = score_parts(&heavy, "Tour", "Call 305-555-1212", None);
        assert_eq!(r.score, 100);

        let r = score_parts(&heavy, "Newsletter", "Unsubscribe", None);
        assert_eq!(r.score, 0);
    }
}
