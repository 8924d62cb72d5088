use anyhow::{bail, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

fn format_with_offset(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()
}

fn format_naive(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Convert a source timestamp to ISO-8601.
///
/// The offset is kept when the source carries one; a bare date becomes
/// midnight without an offset.
pub fn to_iso(raw: &str) -> Result<String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Ok(format_with_offset(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(format_with_offset(&dt));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Ok(format_with_offset(&dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(format_naive(&dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(format_naive(&dt));
        }
    }

    bail!("Unrecognized timestamp '{}'", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jira_rss_format() {
        assert_eq!(
            to_iso("Tue, 5 Mar 2019 10:23:45 +0000").unwrap(),
            "2019-03-05T10:23:45+00:00"
        );
        assert_eq!(
            to_iso("Mon, 11 Nov 2019 17:02:13 -0500").unwrap(),
            "2019-11-11T17:02:13-05:00"
        );
    }

    #[test]
    fn test_rfc3339_keeps_offset_and_fraction() {
        assert_eq!(
            to_iso("2024-01-15T08:30:00.250+02:00").unwrap(),
            "2024-01-15T08:30:00.250+02:00"
        );
        assert_eq!(
            to_iso("2024-01-15T08:30:00Z").unwrap(),
            "2024-01-15T08:30:00+00:00"
        );
    }

    #[test]
    fn test_compact_offset() {
        assert_eq!(
            to_iso("2024-01-15T08:30:00.000+0100").unwrap(),
            "2024-01-15T08:30:00+01:00"
        );
    }

    #[test]
    fn test_naive_forms() {
        assert_eq!(
            to_iso("2024-01-15 08:30:00").unwrap(),
            "2024-01-15T08:30:00"
        );
        assert_eq!(to_iso("2024-01-15").unwrap(), "2024-01-15T00:00:00");
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(
            to_iso("  Tue, 5 Mar 2019 10:23:45 +0000\n").unwrap(),
            "2019-03-05T10:23:45+00:00"
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = to_iso("yesterday-ish").unwrap_err();
        assert!(err.to_string().contains("yesterday-ish"));
        assert!(to_iso("").is_err());
    }
}
