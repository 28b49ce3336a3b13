//! Lenient serde for task dates.
//!
//! The backend may send plain dates or full timestamps; only the calendar
//! date is kept. Dates go back out through chrono's own `YYYY-MM-DD` form.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date the way the backend tends to send it.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Deserialize an optional task date. Values that are not a parseable date
/// string, including numbers and objects, become `None` with a warning.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => {
            let parsed = parse_date(&s);
            if parsed.is_none() {
                tracing::warn!("Ignoring unparseable task date: {:?}", s);
            }
            parsed
        }
        Some(other) => {
            tracing::warn!("Ignoring non-string task date: {}", other);
            None
        }
    })
}
