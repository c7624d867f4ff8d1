use chrono::DateTime;
use serde::Deserialize;

use crate::models::{RequestedWindow, SchedulingExtraction};
use crate::services::ai::{locate_json, LlmProvider, Message, Parsed};

const SYSTEM_PROMPT: &str = r#"You read messages sent to a real-estate agent and pull out scheduling details.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "detectedProperty": "the address or listing the sender is asking about, or null",
  "requestedWindows": [{"start": "ISO-8601 datetime", "end": "ISO-8601 datetime"}]
}

Use an empty list when the sender names no specific times. Never invent a property.
"#;

pub async fn extract_scheduling(
    llm: &dyn LlmProvider,
    subject: &str,
    body: &str,
) -> anyhow::Result<Parsed<SchedulingExtraction>> {
    let content = format!("Subject: {subject}\n\n{body}");
    let response = llm.chat(SYSTEM_PROMPT, &[Message::user(content)]).await?;
    Ok(parse_extraction(&response))
}

/// Wire shape of the extraction reply. `requestedWindows` must be present;
/// `detectedProperty` may be null or missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionReply {
    #[serde(default)]
    detected_property: Option<String>,
    requested_windows: Vec<RequestedWindow>,
}

/// Keeps a requested window only when both ends are RFC 3339 instants and
/// the end is after the start.
fn well_formed(window: &RequestedWindow) -> Option<RequestedWindow> {
    let start = window.start.trim();
    let end = window.end.trim();
    let (Ok(s), Ok(e)) = (DateTime::parse_from_rfc3339(start), DateTime::parse_from_rfc3339(end))
    else {
        return None;
    };
    (e > s).then(|| RequestedWindow {
        start: start.to_string(),
        end: end.to_string(),
    })
}

pub fn parse_extraction(response: &str) -> Parsed<SchedulingExtraction> {
    let Some(raw) = locate_json::<ExtractionReply>(response) else {
        tracing::warn!("failed to parse LLM scheduling JSON, continuing without it");
        return Parsed::Fallback(SchedulingExtraction::default());
    };

    let detected_property = raw
        .detected_property
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("null"));

    let total = raw.requested_windows.len();
    let requested_windows: Vec<RequestedWindow> =
        raw.requested_windows.iter().filter_map(well_formed).collect();
    if requested_windows.len() < total {
        tracing::debug!(
            dropped = total - requested_windows.len(),
            "ignoring malformed requested windows"
        );
    }

    Parsed::Ok(SchedulingExtraction {
        detected_property,
        requested_windows,
    })
}
