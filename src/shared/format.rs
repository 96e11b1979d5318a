use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Human readable size, e.g. `500 B`, `2.00 KB`, `1.50 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{:.2} KB", bytes / KIB)
    } else {
        format!("{:.2} MB", bytes / MIB)
    }
}

/// Parse an upload timestamp as emitted by the endpoint.
///
/// Accepts RFC 3339 as well as ISO-8601 without an offset, which is
/// interpreted as UTC.
pub fn parse_uploaded_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Upload timestamp in local time; unparsable input is returned unchanged
pub fn format_uploaded_at(raw: &str) -> String {
    format_uploaded_at_in(raw, &Local)
}

pub fn format_uploaded_at_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match parse_uploaded_at(raw) {
        Some(dt) => dt
            .with_timezone(tz)
            .format("%d.%m.%Y, %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}
