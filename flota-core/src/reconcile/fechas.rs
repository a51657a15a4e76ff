//! Lenient calendar-date parsing for the date shapes found in the legacy data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::is_blank;

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2}|\d{4})$").expect("day-first date regex")
});

static YEAR_FIRST_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").expect("year-first date regex"));

/// Parse a stored date value into a calendar date.
///
/// Accepts strings (see [`parse_fecha_str`]), epoch milliseconds and extended
/// JSON wrappers such as `{"$date": "..."}` or `{"$date": {"$numberLong": "..."}}`.
pub fn parse_fecha(value: &Value) -> Option<NaiveDate> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::String(s) => parse_fecha_str(s),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            from_millis(millis)
        }
        Value::Object(map) => map
            .get("$date")
            .or_else(|| map.get("$numberLong"))
            .and_then(|inner| match inner {
                Value::String(s) if map.contains_key("$numberLong") => s
                    .parse::<i64>()
                    .ok()
                    .and_then(from_millis),
                other => parse_fecha(other),
            }),
        _ => None,
    }
}

fn from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Parse a date string: ISO dates and datetimes first, then day-first forms
pub fn parse_fecha_str(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if is_blank(&Value::String(text.to_string())) {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    // Day-first forms may carry a trailing time ("25/09/2024 00:00")
    let date_part = text.split_whitespace().next().unwrap_or(text);

    if let Some(caps) = YEAR_FIRST_SLASH.captures(date_part) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = DAY_FIRST.captures(date_part)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
