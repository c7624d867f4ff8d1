use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ExtractedEntities, ScoringRules, SourceType};

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d+])((?:\+?1[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4})(?:\D|$)")
        .expect("phone pattern")
});

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\$\s?\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\$\s?\d+(?:\.\d+)?(?:\s?(?:k|mm|million)\b)?|\b\d+(?:\.\d+)?\s?(?:k|mm|million)\b)",
    )
    .expect("price pattern")
});

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,6}\s+(?:[A-Za-z0-9][A-Za-z0-9.'-]*\s+){1,4}?(?i:st|street|ave|avenue|rd|road|blvd|boulevard|dr|drive|ln|lane|ct|court|way|pkwy|parkway|place|pl|terrace|ter)\b\.?)",
    )
    .expect("address pattern")
});

/// First US-style phone number, normalized to `+1-NNN-NNN-NNNN`.
pub fn extract_phone(text: &str) -> Option<String> {
    let raw = PHONE.captures(text)?.get(1)?.as_str();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return None,
    };
    Some(format!(
        "+1-{}-{}-{}",
        &national[0..3],
        &national[3..6],
        &national[6..10]
    ))
}

/// First currency-like figure, normalized to whole dollars (`$450,000`), or
/// dollars and cents when cents are present.
pub fn extract_price(text: &str) -> Option<String> {
    let raw = PRICE.captures(text)?.get(1)?.as_str();
    normalize_price(raw)
}

fn normalize_price(raw: &str) -> Option<String> {
    let lower = raw.to_lowercase();
    let compact: String = lower
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    let (number, multiplier) = if let Some(n) = compact.strip_suffix("million") {
        (n, 1_000_000.0)
    } else if let Some(n) = compact.strip_suffix("mm") {
        (n, 1_000_000.0)
    } else if let Some(n) = compact.strip_suffix('k') {
        (n, 1_000.0)
    } else {
        (compact.as_str(), 1.0)
    };

    let value: f64 = number.parse().ok()?;
    let cents = (value * multiplier * 100.0).round() as u64;
    let dollars = group_thousands(cents / 100);
    match cents % 100 {
        0 => Some(format!("${dollars}")),
        c => Some(format!("${dollars}.{c:02}")),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// First `<number> <words> <street suffix>` run.
pub fn extract_address(text: &str) -> Option<String> {
    ADDRESS
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

pub fn detect_time_ask(rules: &ScoringRules, text: &str) -> bool {
    rules.time.is_match(text)
}

/// Seller wording wins over a portal sender; anything else is unknown.
pub fn guess_source_type(
    rules: &ScoringRules,
    subject: &str,
    body: &str,
    from: Option<&str>,
) -> SourceType {
    if rules.seller.is_match(subject) || rules.seller.is_match(body) {
        return SourceType::Seller;
    }
    if detect_portal(rules, subject, from).is_some() {
        return SourceType::Buyer;
    }
    SourceType::Unknown
}

/// Recognized listing portal in the `From` header or the subject.
pub fn detect_portal(rules: &ScoringRules, subject: &str, from: Option<&str>) -> Option<String> {
    from.and_then(|f| rules.portal_in(f))
        .or_else(|| rules.portal_in(subject))
        .map(|d| d.to_string())
}

pub fn extract_entities(
    rules: &ScoringRules,
    subject: &str,
    body: &str,
    from: Option<&str>,
) -> ExtractedEntities {
    let text = format!("{subject}\n{body}");

    ExtractedEntities {
        phone: extract_phone(&text),
        price: extract_price(&text),
        address: extract_address(&text),
        time_ask: detect_time_ask(rules, &text),
        source_type: guess_source_type(rules, subject, body, from),
        portal: detect_portal(rules, subject, from),
    }
}
