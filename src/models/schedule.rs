use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Longest meeting accepted, one full day.
pub const MAX_MEETING_MINUTES: i64 = 24 * 60;

/// One occupied calendar span, half-open `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start.max(start) < self.end.min(end)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkHours {
    pub start: u32,
    pub end: u32,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self { start: 9, end: 18 }
    }
}

/// Time-of-day window with no meetings. `start > end` wraps past midnight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuietHours {
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
}

impl QuietHours {
    pub fn contains_hour(&self, hour: u32) -> bool {
        match (self.start, self.end) {
            (Some(s), Some(e)) if s == e => false,
            (Some(s), Some(e)) if s < e => hour >= s && hour < e,
            (Some(s), Some(e)) => hour >= s || hour < e,
            (Some(s), None) => hour >= s,
            (None, Some(e)) => hour < e,
            (None, None) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPreferences {
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub work_hours: WorkHours,
    #[serde(default = "default_meeting_len")]
    pub meeting_len_minutes: i64,
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_meeting_len() -> i64 {
    30
}

impl Default for SchedulingPreferences {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            work_hours: WorkHours::default(),
            meeting_len_minutes: default_meeting_len(),
            quiet_hours: None,
        }
    }
}

impl SchedulingPreferences {
    /// Checks the preferences and resolves the timezone.
    pub fn validate(&self) -> Result<Tz, AppError> {
        let tz: Tz = self.time_zone.parse().map_err(|_| {
            AppError::Validation(format!("unknown time zone: {}", self.time_zone))
        })?;

        let WorkHours { start, end } = self.work_hours;
        if start > 23 || end > 24 {
            return Err(AppError::Validation(format!(
                "work hours out of range: {start}-{end}"
            )));
        }
        if end <= start {
            return Err(AppError::Validation(format!(
                "work hours end ({end}) must be after start ({start})"
            )));
        }
        if self.meeting_len_minutes <= 0 {
            return Err(AppError::Validation(format!(
                "meeting length must be positive, got {}",
                self.meeting_len_minutes
            )));
        }
        if self.meeting_len_minutes > MAX_MEETING_MINUTES {
            return Err(AppError::Validation(format!(
                "meeting length must be at most {MAX_MEETING_MINUTES} minutes, got {}",
                self.meeting_len_minutes
            )));
        }
        if let Some(quiet) = &self.quiet_hours {
            let out_of_range = |h: Option<u32>| h.is_some_and(|h| h > 24);
            if out_of_range(quiet.start) || out_of_range(quiet.end) {
                return Err(AppError::Validation(
                    "quiet hours must be between 0 and 24".to_string(),
                ));
            }
        }

        Ok(tz)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A window the sender asked for, as reported by the LLM. Advisory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestedWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingExtraction {
    #[serde(default)]
    pub detected_property: Option<String>,
    #[serde(default)]
    pub requested_windows: Vec<RequestedWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComposedReply {
    pub detected_property: Option<String>,
    pub requested_windows: Vec<RequestedWindow>,
    pub proposed_windows: Vec<ProposedWindow>,
    #[serde(rename = "emailDraft", alias = "bodyText")]
    pub body_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(start: u32, end: u32, len: i64) -> SchedulingPreferences {
        SchedulingPreferences {
            time_zone: "America/New_York".to_string(),
            work_hours: WorkHours { start, end },
            meeting_len_minutes: len,
            quiet_hours: None,
        }
    }

    #[test]
    fn test_quiet_hours_wrap_midnight() {
        let quiet = QuietHours {
            start: Some(22),
            end: Some(7),
        };
        assert!(quiet.contains_hour(23));
        assert!(quiet.contains_hour(0));
        assert!(quiet.contains_hour(6));
        assert!(!quiet.contains_hour(7));
        assert!(!quiet.contains_hour(12));
        assert!(quiet.contains_hour(22));
    }

    #[test]
    fn test_quiet_hours_same_day_and_open_ended() {
        let lunch = QuietHours {
            start: Some(12),
            end: Some(13),
        };
        assert!(lunch.contains_hour(12));
        assert!(!lunch.contains_hour(13));

        let evenings = QuietHours {
            start: Some(19),
            end: None,
        };
        assert!(evenings.contains_hour(20));
        assert!(!evenings.contains_hour(18));

        assert!(!QuietHours::default().contains_hour(3));
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let tz = prefs(9, 18, 60).validate().unwrap();
        assert_eq!(tz, chrono_tz::America::New_York);
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let err = prefs(18, 9, 60).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(prefs(9, 9, 60).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_length() {
        assert!(prefs(9, 18, 0).validate().is_err());
        assert!(prefs(9, 18, -30).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_length() {
        assert!(prefs(9, 18, MAX_MEETING_MINUTES).validate().is_ok());
        let err = prefs(9, 18, MAX_MEETING_MINUTES + 1).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(prefs(9, 18, i64::MAX / 2).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_zone() {
        let mut p = prefs(9, 18, 30);
        p.time_zone = "Mars/Olympus_Mons".to_string();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_preferences_from_camel_case_json() {
        let json = r#"{"timeZone":"America/Chicago","workHours":{"start":8,"end":17},"meetingLenMinutes":45,"quietHours":{"start":22,"end":7}}"#;
        let p: SchedulingPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(p.work_hours.start, 8);
        assert_eq!(p.meeting_len_minutes, 45);
        assert_eq!(p.quiet_hours.unwrap().start, Some(22));
    }

    #[test]
    fn test_busy_overlap_is_half_open() {
        let at = |h: u32| {
            chrono::NaiveDate::from_ymd_opt(2025, 6, 16)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
                .and_utc()
        };
        let busy = BusyInterval::new(at(10), at(11));
        assert!(busy.overlaps(at(10), at(11)));
        assert!(!busy.overlaps(at(11), at(12)));
        assert!(!busy.overlaps(at(9), at(10)));
    }
}
