//! Lenient date parsing for page metadata

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses the date formats seen in page metadata
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`
/// and bare `YYYY-MM-DD`. Naive values are taken as UTC. A leading
/// `Published:` label is dropped.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let mut text = raw.trim();
    if let Some(index) = text.find("Published:") {
        text = text[index + "Published:".len()..].trim();
    }
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Feed entry dates are never rejected: missing or future dates become now
pub fn clamp_to_now(date: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match date {
        Some(date) if date <= now => date,
        _ => now,
    }
}
