//! Permit date canonicalisation to `YYYYMMDD`.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").expect("slash date regex")
});

static ISO_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("iso date regex"));

/// Spreadsheet serial day numbers stay below this many digits.
const MAX_SERIAL_DIGITS: usize = 5;

/// Canonicalises a registry permit date.
///
/// Accepts `YYYYMMDD`, spreadsheet serial day numbers (1899-12-30 epoch),
/// `M/D/YY` or `M/D/YYYY` (two-digit years above 50 are 19xx), and
/// `YYYY-MM-DD` prefixes. Anything else keeps its first eight digits.
/// Empty input stays empty.
pub fn canonical_permit_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    if let Some(date) = excel_serial(value) {
        return date.format("%Y%m%d").to_string();
    }
    if let Some(caps) = SLASH_DATE.captures(value) {
        let month: u32 = caps[1].parse().unwrap_or_default();
        let day: u32 = caps[2].parse().unwrap_or_default();
        let mut year: u32 = caps[3].parse().unwrap_or_default();
        if year < 100 {
            year += if year > 50 { 1900 } else { 2000 };
        }
        return format!("{year}{month:02}{day:02}");
    }
    if let Some(caps) = ISO_PREFIX.captures(value) {
        return format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
    }
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(8)
        .collect()
}

/// Whole or fractional serial day number, as spreadsheets export dates.
fn excel_serial(value: &str) -> Option<NaiveDate> {
    let whole = value.split_once('.').map_or(value, |(whole, _)| whole);
    if whole.is_empty()
        || whole.len() > MAX_SERIAL_DIGITS
        || !whole.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let serial: f64 = value.parse().ok()?;
    let days = serial.trunc();
    if days < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    // Bounded by MAX_SERIAL_DIGITS, so the cast cannot truncate.
    epoch.checked_add_days(Days::new(days as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_compact_dates() {
        assert_eq!(canonical_permit_date(" 20060101 "), "20060101");
    }

    #[test]
    fn converts_spreadsheet_serials() {
        assert_eq!(canonical_permit_date("38718"), "20060101");
        assert_eq!(canonical_permit_date("36000.5"), "19980724");
    }

    #[test]
    fn converts_slash_dates() {
        assert_eq!(canonical_permit_date("7/13/98"), "19980713");
        assert_eq!(canonical_permit_date("9/27/01"), "20010927");
        assert_eq!(canonical_permit_date("12/1/2015"), "20151201");
    }

    #[test]
    fn converts_iso_prefixes() {
        assert_eq!(canonical_permit_date("2015-01-26"), "20150126");
        assert_eq!(canonical_permit_date("2015-01-26 00:00:00"), "20150126");
    }

    #[test]
    fn falls_back_to_leading_digits() {
        assert_eq!(canonical_permit_date("2015.01.26"), "20150126");
        assert_eq!(canonical_permit_date(""), "");
        assert_eq!(canonical_permit_date("미상"), "");
    }
}
