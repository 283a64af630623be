//! Due-date parsing shared by the validator and the schema layer.
//!
//! Accepted shapes: RFC 3339 and RFC 2822 timestamps, calendar dates
//! (`2024-05-01`, `2024/05/01`, `05/01/2024`, `May 1, 2024`, `1 May 2024`)
//! at midnight UTC, naive `YYYY-MM-DDTHH:MM[:SS]` timestamps (read as UTC),
//! and epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const CALENDAR_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a textual date. Returns `None` if the text is not a valid calendar date.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(date) = CALENDAR_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Interpret epoch milliseconds. Fractional milliseconds are truncated.
#[must_use]
pub fn date_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = millis.trunc() as i64;
    Utc.timestamp_millis_opt(whole).single()
}

/// Parse a JSON value as a date: strings via [`parse_date`], numbers as epoch
/// milliseconds. Every other shape is rejected.
#[must_use]
pub fn date_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => parse_date(raw),
        Value::Number(number) => number.as_f64().and_then(date_from_millis),
        _ => None,
    }
}
