use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_DATE: &str = "Unknown date";

const DISPLAY_FORMAT: &str = "%b %-d, %Y at %-I:%M %p";

/// Which clock timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDisplay {
    #[default]
    Utc,
    Local,
}

/// Formats a backend timestamp as `"Feb 23, 2026 at 12:49 PM"` in UTC.
pub fn format_date(value: &str) -> String {
    parse_timestamp(value).map_or_else(|| UNKNOWN_DATE.to_string(), |ts| format_in(&ts, &Utc))
}

pub fn format_date_with(value: &str, display: TimeDisplay) -> String {
    match display {
        TimeDisplay::Utc => format_date(value),
        TimeDisplay::Local => parse_timestamp(value)
            .map_or_else(|| UNKNOWN_DATE.to_string(), |ts| format_in(&ts, &Local)),
    }
}

fn format_in<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

/// Accepts RFC 3339, naive ISO date-times (taken as UTC) and plain dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
