use chrono::{DateTime, Days, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::errors::AppError;
use crate::models::{BusyInterval, ProposedWindow, QuietHours, SchedulingPreferences};

pub const MAX_WINDOWS: usize = 3;
pub const HORIZON_DAYS: u64 = 3;

/// Rounds up to the next `:00` or `:30`. Minute 0 stays put.
pub fn snap_to_half_hour(dt: NaiveDateTime) -> NaiveDateTime {
    let base = dt
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt);
    match base.minute() {
        0 => base,
        1..=30 => base.with_minute(30).unwrap_or(base),
        m => base + Duration::minutes(60 - m as i64),
    }
}

fn touches_quiet_hours(quiet: &QuietHours, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
    let mut t = start;
    while t < end {
        if quiet.contains_hour(t.hour()) {
            return true;
        }
        t += Duration::minutes(30);
    }
    let last_minute = end - Duration::minutes(1);
    quiet.contains_hour(last_minute.hour())
}

/// Up to three conflict-free windows over today and the next two days, in
/// the preference timezone. Candidates before `now` are skipped.
pub fn propose_windows(
    prefs: &SchedulingPreferences,
    busy: &[BusyInterval],
    now: DateTime<Utc>,
) -> Result<Vec<ProposedWindow>, AppError> {
    let tz = prefs.validate()?;
    let len = Duration::minutes(prefs.meeting_len_minutes);
    let len_hours = (prefs.meeting_len_minutes + 59) / 60;
    let work = prefs.work_hours;
    let quiet = prefs.quiet_hours.unwrap_or_default();

    let last_start_hour = work.end as i64 - len_hours;
    if last_start_hour < work.start as i64 {
        tracing::debug!(
            meeting_len = prefs.meeting_len_minutes,
            "meeting does not fit inside work hours"
        );
        return Ok(Vec::new());
    }

    let today = now.with_timezone(&tz).date_naive();
    let mut windows = Vec::with_capacity(MAX_WINDOWS);

    for offset in 0..HORIZON_DAYS {
        let Some(day) = today.checked_add_days(Days::new(offset)) else {
            break;
        };

        for hour in work.start..=last_start_hour as u32 {
            let Some(candidate) = day.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            let snapped = snap_to_half_hour(candidate);
            if snapped.date() != day || snapped.hour() < work.start || snapped.hour() >= work.end {
                continue;
            }

            // Earliest reading of an ambiguous local time; none inside a DST gap.
            let Some(start_local) = tz.from_local_datetime(&snapped).earliest() else {
                tracing::debug!(%snapped, "local time does not exist, skipping");
                continue;
            };
            let start = start_local.with_timezone(&Utc);
            if start < now {
                continue;
            }
            let end = start + len;

            if touches_quiet_hours(&quiet, start_local, end.with_timezone(&tz)) {
                tracing::debug!(%start, "candidate falls in quiet hours");
                continue;
            }
            if busy.iter().any(|b| b.overlaps(start, end)) {
                tracing::debug!(%start, "candidate overlaps busy interval");
                continue;
            }

            windows.push(ProposedWindow { start, end });
            if windows.len() == MAX_WINDOWS {
                return Ok(windows);
            }
        }
    }

    Ok(windows)
}
