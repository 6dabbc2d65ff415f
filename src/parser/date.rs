//! Publication-date resolution
//!
//! Listing cards display the publication date in loose, sometimes relative
//! forms ("Today at 14:30", "3 days ago", "25 December 2024"). This module
//! resolves them to absolute UTC timestamps.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RELATIVE_DAY: Regex =
        Regex::new(r"(?i)^(today|yesterday)(?:\s+at\s+(\d{1,2}):(\d{2}))?$")
            .expect("Invalid relative-day pattern");
    static ref AGO: Regex = Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week|month)s?\s+ago$")
        .expect("Invalid ago pattern");
}

/// Resolve a possibly-relative publication date to an absolute timestamp
///
/// Returns `None` when the text matches no known form.
pub fn resolve(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = RELATIVE_DAY.captures(text) {
        let base = match caps.get(1)?.as_str().to_lowercase().as_str() {
            "today" => Utc::now(),
            _ => Utc::now() - Duration::days(1),
        };

        // "Today at 14:30" pins the clock time; bare "Today" keeps now
        if let (Some(h), Some(m)) = (caps.get(2), caps.get(3)) {
            let hour = h.as_str().parse::<u32>().ok()?;
            let minute = m.as_str().parse::<u32>().ok()?;
            let pinned = base.date_naive().and_hms_opt(hour, minute, 0)?;
            return Some(pinned.and_utc());
        }

        return Some(base);
    }

    if let Some(caps) = AGO.captures(text) {
        let amount = caps.get(1)?.as_str().parse::<i64>().ok()?;
        let span = match caps.get(2)?.as_str().to_lowercase().as_str() {
            "minute" => Duration::minutes(amount),
            "hour" => Duration::hours(amount),
            "day" => Duration::days(amount),
            "week" => Duration::weeks(amount),
            // Calendar months are not uniform; 30 days is close enough for
            // a display string this coarse
            "month" => Duration::days(30 * amount),
            _ => return None,
        };
        return Some(Utc::now() - span);
    }

    parse_absolute(text)
}

/// Parse absolute date forms into DateTime<Utc>
fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S", // 2024-12-25 15:45:00
        "%Y-%m-%d %H:%M",    // 2024-12-25 15:45
        "%d.%m.%Y %H:%M",    // 25.12.2024 15:45
    ];

    for format in &datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    let date_formats = [
        "%Y-%m-%d",  // 2024-12-25
        "%d.%m.%Y",  // 25.12.2024
        "%d %B %Y",  // 25 December 2024
    ];

    for format in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_resolve_today() {
        let resolved = resolve("Today").unwrap();
        assert_eq!(resolved.date_naive(), Utc::now().date_naive());
    }

    #[test]
    fn test_resolve_today_with_time() {
        let resolved = resolve("Today at 14:30").unwrap();
        assert_eq!(resolved.date_naive(), Utc::now().date_naive());
        assert_eq!(resolved.hour(), 14);
        assert_eq!(resolved.minute(), 30);
    }

    #[test]
    fn test_resolve_yesterday() {
        let resolved = resolve("yesterday").unwrap();
        let expected = Utc::now() - Duration::days(1);
        assert_eq!(resolved.date_naive(), expected.date_naive());
    }

    #[test]
    fn test_resolve_days_ago() {
        let resolved = resolve("3 days ago").unwrap();
        let expected = Utc::now() - Duration::days(3);
        assert!((resolved - expected).num_seconds().abs() < 60);
    }

    #[test]
    fn test_resolve_single_unit_ago() {
        let resolved = resolve("1 hour ago").unwrap();
        let expected = Utc::now() - Duration::hours(1);
        assert!((resolved - expected).num_seconds().abs() < 60);
    }

    #[test]
    fn test_resolve_absolute_date() {
        let resolved = resolve("25 December 2024").unwrap();
        assert_eq!(resolved.format("%Y-%m-%d").to_string(), "2024-12-25");

        let resolved = resolve("2024-12-25").unwrap();
        assert_eq!(resolved.format("%Y-%m-%d").to_string(), "2024-12-25");

        let resolved = resolve("25.12.2024").unwrap();
        assert_eq!(resolved.format("%Y-%m-%d").to_string(), "2024-12-25");
    }

    #[test]
    fn test_resolve_absolute_datetime() {
        let resolved = resolve("2024-12-25 15:45").unwrap();
        assert_eq!(resolved.hour(), 15);
        assert_eq!(resolved.minute(), 45);
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(resolve("").is_none());
        assert!(resolve("   ").is_none());
        assert!(resolve("sometime soon").is_none());
        assert!(resolve("Today at 99:99").is_none());
    }
}
