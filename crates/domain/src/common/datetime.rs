//! DateTime parsing and formatting utilities with consistent error handling.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use chrono_tz::Tz;
use regex_lite::Regex;
use std::sync::LazyLock;

static ISO_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.?\d*Z$").expect("valid regex")
});

/// Parses an RFC3339 timestamp string, returning an error if parsing fails.
///
/// # Examples
///
/// ```
/// use tripkit_domain::common::parse_datetime;
/// use chrono::Datelike;
///
/// let dt = parse_datetime("2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(dt.year(), 2024);
/// ```
///
/// # Errors
///
/// Returns `chrono::ParseError` if the string is not valid RFC3339.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Formats a timestamp the way history entries and ops store it:
/// millisecond precision with a `Z` suffix.
pub fn iso_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter storing a timestamp as an [`iso_string`].
///
/// Use with `#[serde(with = "crate::common::datetime::iso_millis")]`.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::iso_string(*dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_datetime(&s).map_err(serde::de::Error::custom)
    }
}

/// True when the whole string is a UTC ISO-8601 timestamp.
pub fn is_iso_timestamp(s: &str) -> bool {
    ISO_TIME_RE.is_match(s)
}

/// Short local time, e.g. `3:05pm`.
pub fn format_short_time(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%-I:%M%P").to_string()
}

/// Shift `base` by a signed number of seconds, rounded to the millisecond.
///
/// `None` when the result falls outside the representable range.
pub fn offset_by_seconds(base: DateTime<Utc>, seconds: f64) -> Option<DateTime<Utc>> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() {
        return None;
    }
    base.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

/// Convert a duration shorthand like `3s` or `10m` into seconds.
///
/// Anything malformed, zero, or negative yields `0.0`.
///
/// ```
/// use tripkit_domain::common::seconds_for_duration_shorthand;
///
/// assert_eq!(seconds_for_duration_shorthand("3s"), 3.0);
/// assert_eq!(seconds_for_duration_shorthand("1.5m"), 90.0);
/// assert_eq!(seconds_for_duration_shorthand("2h"), 0.0);
/// ```
pub fn seconds_for_duration_shorthand(shorthand: &str) -> f64 {
    let shorthand = shorthand.trim();
    let Some(unit) = shorthand.chars().last() else {
        return 0.0;
    };
    let multiplier = match unit {
        's' => 1.0,
        'm' => 60.0,
        _ => return 0.0,
    };
    let number = &shorthand[..shorthand.len() - unit.len_utf8()];
    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n * multiplier,
        _ => 0.0,
    }
}
