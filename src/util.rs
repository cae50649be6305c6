// Utility helpers for parsing, rounding and calendar keys.
//
// This module centralizes the "dirty" timestamp handling and the integer
// rounding rules so the aggregators can assume clean, typed values.
use crate::types::RawTimestamp;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use num_format::{Locale, ToFormattedString};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// Minute-precision forms that RFC 3339 rejects, e.g. `2024-06-10T09:00+05:30`.
const OFFSET_MINUTE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Parse a raw `createdAt` into an instant.
///
/// - Integers (and finite floats, truncated) are epoch milliseconds.
/// - Text with an offset (RFC 3339, or minute precision) is taken as-is.
/// - Text without an offset is wall-clock time in `tz`.
/// - A bare `YYYY-MM-DD` is midnight UTC of that date.
/// - Everything else is `None`.
pub fn parse_timestamp<Tz: TimeZone>(raw: Option<&RawTimestamp>, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = match raw? {
        RawTimestamp::Millis(ms) => return Utc.timestamp_millis_opt(*ms).single(),
        RawTimestamp::Other(value) => {
            let ms = value.as_f64().filter(|f| f.is_finite())?;
            return Utc.timestamp_millis_opt(ms.trunc() as i64).single();
        }
        RawTimestamp::Text(s) => s.trim(),
    };
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_minute_with_offset(s) {
        return Some(dt);
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(&naive, tz);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn parse_minute_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Some(naive) = s.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M")
            .ok()
            .map(|n| n.and_utc());
    }
    OFFSET_MINUTE_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Wall-clock time in `tz` to an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward by the gap (one hour).
fn local_to_utc<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(*naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// `round(part / total * 100)` with half-up rounding, done in integers.
/// Returns 0 for an empty total.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (part as u64, total as u64);
    ((200 * part + total) / (2 * total)) as u32
}

/// `round(sum / count)` with half-up rounding; 0 when `count` is 0.
pub fn rounded_mean(sum: u64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    ((2 * sum + count) / (2 * count)) as u32
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 records loaded`).
    n.to_formatted_string(&Locale::en)
}
