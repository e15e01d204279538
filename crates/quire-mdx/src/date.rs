//! Publication date parsing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};

/// A point in time with the offset it was written in.
pub type Timestamp = DateTime<FixedOffset>;

/// Naive date-time layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Layouts carrying an explicit offset that RFC 3339 rejects.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M:%S%z"];

/// A date value that matched none of the accepted layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized date `{0}`, expected RFC 3339 or YYYY-MM-DD")]
pub struct DateError(pub String);

/// Parse a frontmatter `date` value.
///
/// Accepts RFC 3339 timestamps, naive date-times and plain `YYYY-MM-DD`
/// dates. Values without an offset are taken to be UTC; plain dates resolve
/// to midnight.
pub fn parse_date(value: &str) -> Result<Timestamp, DateError> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| DateError(value.to_string()))
}

/// Format a timestamp the way exported frontmatter writes it.
pub fn format_date(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_plain_date_as_utc_midnight() {
        let ts = parse_date("2024-03-05").unwrap();

        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }

    #[test]
    fn keeps_explicit_offset() {
        let ts = parse_date("2024-03-05T10:30:00+02:00").unwrap();

        assert_eq!(ts.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn parses_naive_datetime_variants() {
        let a = parse_date("2024-03-05 10:30").unwrap();
        let b = parse_date("2024-03-05T10:30:00").unwrap();
        let c = parse_date("2024-03-05T10:30:00Z").unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn parses_spaced_offset() {
        let ts = parse_date("2024-03-05 10:30:00 -0500").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date("yesterday"), Err(DateError("yesterday".into())));
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn formatted_date_parses_back() {
        let ts = parse_date("2024-01-01T08:15:00-03:00").unwrap();
        let text = format_date(&ts);

        assert_eq!(text, "2024-01-01T08:15:00-03:00");
        assert_eq!(parse_date(&text).unwrap(), ts);
    }
}
