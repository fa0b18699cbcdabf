//! Typed parsing of spreadsheet cells.
//!
//! Cells arrive as text. Dates may be ISO strings, day-first local dates or
//! the serial day numbers spreadsheets store internally.

use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Largest serial number spreadsheets accept (9999-12-31).
const MAX_SERIAL_DATE: u64 = 2_958_465;

/// Converts a spreadsheet serial day number to a date.
///
/// Day zero is 1899-12-30, which absorbs the 1900 leap-year quirk for every
/// date after February 1900.
///
/// # Examples
///
/// ```
/// use workforce_engine::import::serial_to_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(serial_to_date(45292), NaiveDate::from_ymd_opt(2024, 1, 1));
/// ```
pub fn serial_to_date(serial: u64) -> Option<NaiveDate> {
    if serial == 0 || serial > MAX_SERIAL_DATE {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial))
}

/// Parses a date cell.
///
/// Tries `YYYY-MM-DD`, an ISO timestamp, `DD/MM/YYYY`, then a serial day
/// number (a fractional time part is dropped).
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return Ok(date);
    }

    let serial = value
        .split_once('.')
        .map_or(value, |(whole, _)| whole)
        .parse::<u64>()
        .ok()
        .and_then(serial_to_date);
    serial.ok_or_else(|| format!("'{}' is not a valid date", value))
}

/// Parses a decimal cell, accepting `,` as a thousands separator.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).map_err(|_| format!("'{}' is not a valid number", raw.trim()))
}

/// Parses an integer cell. Spreadsheets often export whole numbers as
/// `12.0`; a zero fraction is accepted.
pub fn parse_integer<T: FromStr>(raw: &str) -> Result<T, String> {
    let value = raw.trim();
    let whole = match value.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => value,
    };
    whole
        .parse::<T>()
        .map_err(|_| format!("'{}' is not a valid whole number", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_iso_timestamp() {
        assert_eq!(parse_date("2024-01-15T00:00:00").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_day_first_date() {
        assert_eq!(parse_date("15/01/2024").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_serial_date() {
        assert_eq!(parse_date("45306").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("45306.75").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date("next tuesday").is_err());
        assert!(parse_date("0").is_err());
        assert!(parse_date("99999999").is_err());
    }

    #[test]
    fn test_parse_decimal_with_thousands() {
        assert_eq!(parse_decimal("1,250,000").unwrap(), Decimal::new(1_250_000, 0));
        assert_eq!(parse_decimal(" 7.5 ").unwrap(), Decimal::new(75, 1));
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn test_parse_integer_accepts_zero_fraction() {
        assert_eq!(parse_integer::<u32>("12.0").unwrap(), 12);
        assert_eq!(parse_integer::<i32>("2024").unwrap(), 2024);
        assert!(parse_integer::<u32>("12.5").is_err());
    }
}
