//! Format-tolerant calendar date parsing.

use chrono::{Datelike, NaiveDate};

/// Accepted date layouts, tried in order.
///
/// `MM/DD/YYYY` is tried before `DD/MM/YYYY`, so an ambiguous value such as
/// `03/04/2024` reads as March 4th. Unambiguous values like `25/12/2024` fall
/// through to the day-first layout.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Parses a calendar date, rejecting calendrically invalid input such as `2023-02-30`.
///
/// A leading ISO date followed by a time part (`2023-01-15T09:30:00Z`,
/// `2023-01-15 09:30`) is accepted as that date.
///
/// # Examples
///
/// ```rust
/// use form_guard::rules::dates::parse_date;
///
/// assert!(parse_date("2023-01-15").is_some());
/// assert!(parse_date("01/15/2023").is_some());
/// assert!(parse_date("2023-02-30").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // Date-time values: keep the date part only.
    match (trimmed.get(..10), trimmed.get(10..)) {
        (Some(date_part), Some(rest)) if rest.starts_with('T') || rest.starts_with(' ') => {
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

/// Number of whole years between `birth` and `on`.
pub fn completed_years(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}
