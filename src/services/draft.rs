use chrono_tz::Tz;

use crate::models::ProposedWindow;

const CLOSING: &str =
    "Do any of these work for you? If not, let me know a few times that suit you better.";
const NO_OPENINGS: &str = "I don't have any immediate openings over the next few days. Could you share a few times that work for you?";

pub fn format_window(window: &ProposedWindow, tz: &Tz) -> String {
    window
        .start
        .with_timezone(tz)
        .format("%a, %b %-d at %-I:%M %p (%Z)")
        .to_string()
}

/// Plain-text reply proposing `windows`, rendered in `tz`.
pub fn compose_draft(windows: &[ProposedWindow], detected_property: Option<&str>, tz: &Tz) -> String {
    let opening = match detected_property.map(str::trim).filter(|p| !p.is_empty()) {
        Some(property) => format!("Thanks for reaching out about {property}!"),
        None => "Thanks for reaching out!".to_string(),
    };

    if windows.is_empty() {
        return format!("{opening}\n\n{NO_OPENINGS}");
    }

    let list = windows
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}. {}", i + 1, format_window(w, tz)))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{opening} Here are a few times I'm available:\n\n{list}\n\n{CLOSING}")
}
