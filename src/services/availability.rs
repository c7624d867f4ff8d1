use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::BusyInterval;

/// Calendar free/busy collaborator.
///
/// Implementations return merged, non-overlapping intervals sorted by start.
#[async_trait]
pub trait AvailabilityResolver: Send + Sync {
    async fn busy_between(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> anyhow::Result<Vec<BusyInterval>>;
}

/// Busy list handed over by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticAvailability {
    busy: Vec<BusyInterval>,
}

impl StaticAvailability {
    pub fn new(busy: Vec<BusyInterval>) -> Self {
        Self {
            busy: normalize_busy(busy),
        }
    }
}

#[async_trait]
impl AvailabilityResolver for StaticAvailability {
    async fn busy_between(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> anyhow::Result<Vec<BusyInterval>> {
        Ok(self
            .busy
            .iter()
            .filter(|b| b.overlaps(time_min, time_max))
            .copied()
            .collect())
    }
}

/// Sorts by start, drops empty spans, and merges overlapping or touching ones.
pub fn normalize_busy(mut busy: Vec<BusyInterval>) -> Vec<BusyInterval> {
    busy.retain(|b| b.end > b.start);
    busy.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(busy.len());
    for interval in busy {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

#[derive(Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: std::collections::HashMap<String, FreeBusyCalendar>,
}

#[derive(Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusySpan>,
}

#[derive(Deserialize)]
struct FreeBusySpan {
    start: String,
    end: String,
}

/// Parses a Google-style free/busy payload into the canonical busy list.
/// Spans from every calendar in the payload are combined.
pub fn parse_freebusy(json: &str) -> anyhow::Result<Vec<BusyInterval>> {
    let response: FreeBusyResponse =
        serde_json::from_str(json).context("failed to parse free/busy response")?;

    let mut busy = Vec::new();
    for (calendar, entry) in response.calendars {
        for span in entry.busy {
            let start = DateTime::parse_from_rfc3339(&span.start)
                .with_context(|| format!("bad busy start in {calendar}: {}", span.start))?
                .with_timezone(&Utc);
            let end = DateTime::parse_from_rfc3339(&span.end)
                .with_context(|| format!("bad busy end in {calendar}: {}", span.end))?
                .with_timezone(&Utc);
            busy.push(BusyInterval::new(start, end));
        }
    }

    Ok(normalize_busy(busy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 16, h, m, 0).unwrap()
    }

    #[test]
    fn test_normalize_merges_and_sorts() {
        let busy = vec![
            BusyInterval::new(at(13, 0), at(14, 0)),
            BusyInterval::new(at(9, 0), at(10, 0)),
            BusyInterval::new(at(9, 30), at(11, 0)),
            BusyInterval::new(at(11, 0), at(11, 30)),
            BusyInterval::new(at(15, 0), at(15, 0)),
        ];
        let merged = normalize_busy(busy);
        assert_eq!(
            merged,
            vec![
                BusyInterval::new(at(9, 0), at(11, 30)),
                BusyInterval::new(at(13, 0), at(14, 0)),
            ]
        );
    }

    #[test]
    fn test_parse_freebusy() {
        let json = r#"{
            "timeMin": "2025-06-16T00:00:00Z",
            "calendars": {
                "primary": {"busy": [
                    {"start": "2025-06-16T10:00:00-04:00", "end": "2025-06-16T11:00:00-04:00"}
                ]},
                "team": {"busy": [
                    {"start": "2025-06-16T14:30:00Z", "end": "2025-06-16T15:30:00Z"}
                ]}
            }
        }"#;
        let busy = parse_freebusy(json).unwrap();
        assert_eq!(busy, vec![BusyInterval::new(at(14, 0), at(15, 30))]);
    }

    #[test]
    fn test_parse_freebusy_rejects_bad_timestamp() {
        let json = r#"{"calendars":{"primary":{"busy":[{"start":"tomorrow","end":"later"}]}}}"#;
        assert!(parse_freebusy(json).is_err());
    }

    #[test]
    fn test_parse_freebusy_empty() {
        assert!(parse_freebusy(r#"{"calendars":{}}"#).unwrap().is_empty());
        assert!(parse_freebusy("{}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_availability_clips_to_range() {
        let resolver = StaticAvailability::new(vec![
            BusyInterval::new(at(8, 0), at(9, 0)),
            BusyInterval::new(at(12, 0), at(13, 0)),
        ]);
        let busy = resolver.busy_between(at(10, 0), at(18, 0)).await.unwrap();
        assert_eq!(busy, vec![BusyInterval::new(at(12, 0), at(13, 0))]);
    }
}
