//! Timezone-aware date normalization and display helpers.
//!
//! Storage always holds UTC; user input is interpreted through the user's
//! IANA timezone on the way in and converted back only for display. All
//! functions take explicit inputs, including the `now` anchor where one is
//! needed; no hidden system-clock access, so date arithmetic is fully
//! deterministic under test.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Naive datetime layouts accepted by the generic parsing fallback, tried in
/// order. All are interpreted in the user's timezone.
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Canonical conversion
// ---------------------------------------------------------------------------

/// Normalize raw user date input to a UTC instant.
///
/// The cascade, first match wins:
/// - absent or blank input → `None`;
/// - a full ISO datetime containing `T` and a `Z` or `+` offset is taken as
///   already canonical;
/// - a bare `YYYY-MM-DD` is pinned to **UTC midnight** of that date. The user
///   timezone is deliberately not consulted here; date-only input does not
///   round-trip to local wall-clock time and callers must not rely on it
///   doing so;
/// - anything else goes through generic parsing: RFC 3339 with any offset,
///   then the naive layouts in [`NAIVE_FORMATS`] interpreted in the user's
///   timezone.
///
/// Unparseable input (or an unrecognized timezone on the naive path) yields
/// `None`; this function never errors.
pub fn to_utc(input: Option<&str>, user_timezone: &str) -> Option<DateTime<Utc>> {
    let raw = input?.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains('T') && (raw.ends_with('Z') || raw.contains('+')) {
        return DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));
    }

    if raw.len() == 10 {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&midnight));
        }
    }

    // Negative-offset ISO strings ("2026-01-05T10:00:00-05:00") land here.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let tz: Tz = user_timezone.parse().ok()?;
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return resolve_local(&tz, naive).map(|dt| dt.with_timezone(&Utc));
        }
    }

    None
}

/// Convert a stored UTC instant into the user's timezone for display.
///
/// Display-only by contract: never used to decide storage values, and never
/// fails. An unrecognized timezone falls back to UTC.
pub fn to_user_zone(utc: DateTime<Utc>, user_timezone: &str) -> DateTime<Tz> {
    let tz: Tz = user_timezone.parse().unwrap_or(chrono_tz::UTC);
    utc.with_timezone(&tz)
}

/// Combine separate date and time inputs into a UTC instant, resolving the
/// timezone offset for that specific date so daylight-saving transitions are
/// handled correctly. An ambiguous local time (fall-back fold) takes the
/// earlier offset; a nonexistent one (spring-forward gap) or any parse
/// failure yields `None`.
pub fn combine_date_and_time(
    date: &str,
    time: &str,
    user_timezone: &str,
) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = parse_time(time.trim())?;
    let tz: Tz = user_timezone.parse().ok()?;
    resolve_local(&tz, date.and_time(time)).map(|dt| dt.with_timezone(&Utc))
}

/// Render a UTC instant as the canonical storage string: RFC 3339, UTC,
/// millisecond precision, `Z` suffix. Lexicographic order over these strings
/// matches chronological order.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Relative phrasing for an instant against `now`: "Just now" / "Soon"
/// within a minute, then minutes, hours, and days with pluralization.
pub fn relative_time(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (target - now).num_seconds();

    if seconds >= 0 {
        if seconds < 60 {
            "Soon".to_string()
        } else if seconds < 3_600 {
            format!("in {}", plural(seconds / 60, "minute"))
        } else if seconds < 86_400 {
            format!("in {}", plural(seconds / 3_600, "hour"))
        } else {
            format!("in {}", plural(seconds / 86_400, "day"))
        }
    } else {
        let seconds = -seconds;
        if seconds < 60 {
            "Just now".to_string()
        } else if seconds < 3_600 {
            format!("{} ago", plural(seconds / 60, "minute"))
        } else if seconds < 86_400 {
            format!("{} ago", plural(seconds / 3_600, "hour"))
        } else {
            format!("{} ago", plural(seconds / 86_400, "day"))
        }
    }
}

/// Due-date phrasing computed at day granularity in the user's timezone.
///
/// Both instants are truncated to their calendar date in the user's zone
/// before differencing, so a deadline later today is "Due today" and never
/// "Overdue", regardless of the time of day.
pub fn due_date_relative_time(
    due: DateTime<Utc>,
    user_timezone: &str,
    now: DateTime<Utc>,
) -> String {
    let due_day = to_user_zone(due, user_timezone).date_naive();
    let today = to_user_zone(now, user_timezone).date_naive();
    let days = (due_day - today).num_days();

    match days {
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d if d < 0 => format!("Overdue by {}", plural(-d, "day")),
        d => format!("Due in {} days", d),
    }
}

/// True if the instant falls on the current calendar date in the user's
/// timezone.
pub fn is_today(target: DateTime<Utc>, user_timezone: &str, now: DateTime<Utc>) -> bool {
    to_user_zone(target, user_timezone).date_naive()
        == to_user_zone(now, user_timezone).date_naive()
}

pub fn is_past(target: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    target < now
}

pub fn is_future(target: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    target > now
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// True if either bound is absent (no constraint), otherwise true iff
/// `end >= start`.
pub fn validate_date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

/// True if absent, otherwise true iff the instant is at or after the start
/// of the current day in the user's timezone.
pub fn validate_future_date(
    date: Option<DateTime<Utc>>,
    user_timezone: &str,
    now: DateTime<Utc>,
) -> bool {
    match date {
        None => true,
        Some(date) => {
            to_user_zone(date, user_timezone).date_naive()
                >= to_user_zone(now, user_timezone).date_naive()
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earlier, _) => Some(earlier),
        chrono::LocalResult::None => None,
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}
