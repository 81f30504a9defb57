//! `dd/mm/yyyy` date handling.
//!
//! The backend stores dates as Brazilian-formatted text. Components that fall
//! outside the calendar roll over into the neighbouring month or year, so
//! `31/02/2025` is 3 March 2025 and `00/01/2025` is 31 December 2024.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};

/// Brasília offset used for the "last updated" banner (UTC−3, no DST).
const BRASILIA_OFFSET_SECS: i32 = -3 * 3600;

/// Split strict `DD/MM/YYYY` text into `(day, month, year)`.
///
/// Exactly two digits, slash, two digits, slash, four digits. No surrounding
/// whitespace or extra characters.
pub fn split_br_date(text: &str) -> Option<(u32, u32, i32)> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    let day = text[0..2].parse().ok()?;
    let month = text[3..5].parse().ok()?;
    let year = text[6..10].parse().ok()?;
    Some((day, month, year))
}

/// Build a calendar date from 1-indexed components, rolling over
/// out-of-range day and month values.
pub fn date_from_parts(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    // Month is 1-indexed in the text; the offset from January is 0-indexed.
    let month_index = i64::from(month) - 1;
    let total_months = i64::from(year) * 12 + month_index;
    let y = i32::try_from(total_months.div_euclid(12)).ok()?;
    let m = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    if day == 0 {
        first.checked_sub_days(Days::new(1))
    } else {
        first.checked_add_days(Days::new(u64::from(day) - 1))
    }
}

/// Parse strict `dd/mm/yyyy` text into a calendar date.
pub fn parse_br_date(text: &str) -> Option<NaiveDate> {
    let (day, month, year) = split_br_date(text)?;
    date_from_parts(day, month, year)
}

/// Format a date as `dd/mm/yyyy`.
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Render a UTC timestamp as a Brasília-time `dd/mm/yyyy` date.
pub fn format_brasilia(ts: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(BRASILIA_OFFSET_SECS) {
        Some(offset) => format_br_date(ts.with_timezone(&offset).date_naive()),
        None => format_br_date(ts.date_naive()),
    }
}
