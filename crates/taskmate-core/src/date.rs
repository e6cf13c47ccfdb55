//! Calendar date primitives shared by the query engine and the calendar grid.

use time::{Date, Month, OffsetDateTime, UtcOffset};

/// Weekday column headers, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Convert a 0-based month index (0 = January) into a [`Month`].
#[must_use]
pub fn month_from_index(month0: u8) -> Option<Month> {
    Month::try_from(month0.checked_add(1)?).ok()
}

/// English name of a 0-based month index.
#[must_use]
pub fn month_name(month0: u8) -> Option<&'static str> {
    MONTH_NAMES.get(usize::from(month0)).copied()
}

/// Number of days in the month, computed as "day 0 of the next month".
///
/// Returns `None` only when the month index is out of range or the year is
/// outside the representable calendar.
#[must_use]
pub fn days_in_month(year: i32, month0: u8) -> Option<u8> {
    let (next_year, next_month0) = if month0 == 11 {
        (year.checked_add(1)?, 0)
    } else {
        (year, month0.checked_add(1)?)
    };
    let first_of_next = Date::from_calendar_date(next_year, month_from_index(next_month0)?, 1).ok()?;
    first_of_next.previous_day().map(Date::day)
}

/// Weekday index (0 = Sunday .. 6 = Saturday) of the first day of the month.
#[must_use]
pub fn first_weekday_offset(year: i32, month0: u8) -> Option<u8> {
    let first = Date::from_calendar_date(year, month_from_index(month0)?, 1).ok()?;
    Some(first.weekday().number_days_from_sunday())
}

/// Calendar date of an instant as seen from `offset`.
#[must_use]
pub fn local_date(instant: OffsetDateTime, offset: UtcOffset) -> Date {
    instant.to_offset(offset).date()
}

/// Whether `instant` falls on `date` (same year, month and day) in `offset`.
#[must_use]
pub fn is_same_day(instant: OffsetDateTime, date: Date, offset: UtcOffset) -> bool {
    local_date(instant, offset) == date
}

/// Short human-readable form, e.g. `Mar 10, 2024`.
#[must_use]
pub fn format_date(date: Date) -> String {
    let month = MONTH_NAMES
        .get(usize::from(u8::from(date.month())) - 1)
        .map_or("", |name| &name[..3]);
    format!("{month} {}, {}", date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    #[test]
    fn february_respects_gregorian_leap_rule() {
        assert_eq!(days_in_month(2024, 1), Some(29));
        assert_eq!(days_in_month(2023, 1), Some(28));
        assert_eq!(days_in_month(1900, 1), Some(28));
        assert_eq!(days_in_month(2000, 1), Some(29));
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(days_in_month(2024, 11), Some(31));
        assert_eq!(days_in_month(2024, 3), Some(30));
        assert_eq!(days_in_month(2024, 12), None);
    }

    #[test]
    fn first_weekday_counts_from_sunday() {
        // 2024-09-01 was a Sunday, 2024-02-01 a Thursday.
        assert_eq!(first_weekday_offset(2024, 8), Some(0));
        assert_eq!(first_weekday_offset(2024, 1), Some(4));
        assert_eq!(first_weekday_offset(2024, 12), None);
    }

    #[test]
    fn same_day_uses_calendar_date_not_timestamp() {
        let morning = datetime!(2024-03-10 00:30 UTC);
        let evening = datetime!(2024-03-10 23:30 UTC);
        assert!(is_same_day(morning, date!(2024-03-10), UtcOffset::UTC));
        assert!(is_same_day(evening, date!(2024-03-10), UtcOffset::UTC));
        assert!(is_same_day(evening, date!(2024-03-11), offset!(+2)));
    }

    #[test]
    fn names_and_formatting() {
        assert_eq!(month_name(0), Some("January"));
        assert_eq!(month_name(12), None);
        assert_eq!(format_date(date!(2024-03-10)), "Mar 10, 2024");
        assert_eq!(WEEKDAY_LABELS[0], "Sun");
    }
}
