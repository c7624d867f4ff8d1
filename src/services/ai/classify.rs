use crate::models::LlmVerdict;
use crate::services::ai::{locate_json, LlmProvider, Message, Parsed};

const SYSTEM_PROMPT: &str = r#"You triage inbound messages for a real-estate agent. Decide how likely the message is a genuine lead: someone who wants to buy, sell, rent, or tour a property with this agent.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "score": 0,
  "reason": "one short sentence"
}

Scoring guide:
- 80-100: clear intent to tour, buy, sell, or rent, especially with a property, time, price, or phone number
- 50-79: plausibly interested but vague
- 20-49: unclear, general question, or an existing client's logistics
- 0-19: newsletters, vendors, promotions, job applications, receipts, automated notifications
"#;

pub async fn classify_with_llm(
    llm: &dyn LlmProvider,
    subject: &str,
    body: &str,
) -> anyhow::Result<Parsed<Option<LlmVerdict>>> {
    let content = format!("Subject: {subject}\n\n{body}");
    let response = llm.chat(SYSTEM_PROMPT, &[Message::user(content)]).await?;
    Ok(parse_verdict(&response))
}

/// Scores outside 0-100 fail validation the same way unparsable text does.
pub fn parse_verdict(response: &str) -> Parsed<Option<LlmVerdict>> {
    match locate_json::<LlmVerdict>(response) {
        Some(v) if (0..=100).contains(&v.score) => Parsed::Ok(Some(LlmVerdict {
            score: v.score,
            reason: v.reason.trim().to_string(),
        })),
        Some(v) => {
            tracing::warn!(score = v.score, "LLM score out of range, ignoring verdict");
            Parsed::Fallback(None)
        }
        None => {
            tracing::warn!("failed to parse LLM classification JSON, using rules only");
            Parsed::Fallback(None)
        }
    }
}
