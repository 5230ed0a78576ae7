use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Full date-time layouts, tried in order. Two-digit years come before four-digit ones so
/// "1/2/24" is never read as year 24. Slashed dates are month-first, dotted dates are
/// day-first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%y, %I:%M:%S %p",
    "%m/%d/%y, %I:%M %p",
    "%m/%d/%y, %H:%M:%S",
    "%m/%d/%y, %H:%M",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y, %I:%M %p",
    "%m/%d/%Y, %H:%M:%S",
    "%m/%d/%Y, %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%d.%m.%y, %H:%M:%S",
    "%d.%m.%y, %H:%M",
    "%d.%m.%Y, %H:%M:%S",
    "%d.%m.%Y, %H:%M",
    "%d.%m.%Y %H:%M",
];

const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Collapse the whitespace variants chat exports put around times ("10:15\u{202f}PM").
fn clean(raw: &str) -> String {
    raw.replace(['\u{202f}', '\u{a0}'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an absolute timestamp. Naive times are taken as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
    {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse a bare clock time ("10:15 PM", "22:15").
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let cleaned = clean(raw);
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&cleaned, fmt).ok())
}

/// Anchor a bare time to the date of the previous timestamp, rolling to the next day when
/// the clock went backwards.
pub fn anchor_time(time: NaiveTime, previous: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    let previous = previous?;
    let candidate = previous.date_naive().and_time(time).and_utc();
    if candidate >= previous {
        Some(candidate)
    } else {
        previous
            .date_naive()
            .succ_opt()
            .map(|next| next.and_time(time).and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_iso_and_rfc3339() {
        let a = parse_datetime("2024-03-05 14:30").unwrap();
        assert_eq!((a.year(), a.month(), a.day(), a.hour()), (2024, 3, 5, 14));

        let b = parse_datetime("2024-03-05T14:30:00+02:00").unwrap();
        assert_eq!(b.hour(), 12);
    }

    #[test]
    fn two_digit_year_is_not_year_24() {
        let dt = parse_datetime("1/2/24, 10:15 PM").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 1, 2, 22));
    }

    #[test]
    fn four_digit_slashed_year() {
        let dt = parse_datetime("12/31/2023, 23:59").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 12, 31));
    }

    #[test]
    fn narrow_space_before_meridiem() {
        let dt = parse_datetime("1/2/24, 9:05\u{202f}am").unwrap();
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn dotted_dates_are_day_first() {
        let dt = parse_datetime("02.01.24, 08:00").unwrap();
        assert_eq!((dt.month(), dt.day()), (1, 2));
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_datetime("yesterday-ish").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn anchored_time_rolls_over_midnight() {
        let prev = parse_datetime("2024-01-01 23:50").unwrap();
        let next = anchor_time(parse_time("00:10").unwrap(), Some(prev)).unwrap();
        assert_eq!(next.day(), 2);
        assert!(anchor_time(parse_time("00:10").unwrap(), None).is_none());
    }
}
