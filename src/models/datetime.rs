//! Timezone-less timestamps as they appear on the wire (`YYYY-MM-DDTHH:MM:SS`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current UTC wall-clock time at second precision, matching what the wire
/// format can carry.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format(value: &NaiveDateTime) -> String {
    value.format(WIRE_FORMAT).to_string()
}

pub fn format_opt(value: Option<&NaiveDateTime>) -> Option<String> {
    value.map(format)
}

/// Parses a client-supplied date.
///
/// RFC 3339 input keeps its wall-clock time and drops the offset; the other
/// accepted forms are local date-times with `T` or space separators and a
/// bare date, which is read as midnight.
pub fn parse(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        return Some(with_offset.naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, pattern) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepted_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();

        assert_eq!(parse("2024-12-31T23:59:59"), Some(expected));
        assert_eq!(parse("2024-12-31 23:59:59"), Some(expected));
        assert_eq!(parse("2024-12-31T23:59:59+02:00"), Some(expected));
        assert_eq!(parse("2024-12-31T23:59:59Z"), Some(expected));
        assert_eq!(
            parse("2024-12-31"),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("not-a-date"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("2024-13-01"), None);
    }

    #[test]
    fn test_format_drops_fraction_and_offset() {
        let value = parse("2024-01-02T03:04:05.678").unwrap();
        assert_eq!(format(&value), "2024-01-02T03:04:05");
        assert_eq!(now().nanosecond(), 0);
    }
}
