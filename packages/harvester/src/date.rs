//! Date resolution from Spanish prose and structured BOE date fields.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::DateParseError;

/// Spanish month names in calendar order.
const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// "<day> de <month> de <year>", searched anywhere in the text.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROSE_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<day>[0-9]{1,2}) de (?P<month>\w+) de (?P<year>[0-9]{4})").expect("valid regex")
});

/// Look up a lowercase Spanish month name.
///
/// # Examples
/// ```
/// use boe_harvester::date::month_number;
///
/// assert_eq!(month_number("octubre").unwrap(), 10);
/// assert!(month_number("Octubre").is_err());
/// ```
pub fn month_number(name: &str) -> Result<u32, DateParseError> {
    MONTHS
        .iter()
        .position(|month| *month == name)
        .map(|index| index as u32 + 1)
        .ok_or_else(|| DateParseError::UnknownMonth(name.to_string()))
}

/// Find the first "27 de octubre de 2019"-style date in free text.
///
/// The text is NFKD-normalized first, so no-break spaces the publisher
/// leaves inside date phrases read as plain spaces. Returns `Ok(None)` when
/// the text holds no date-shaped phrase.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use boe_harvester::date::parse_date;
///
/// let date = parse_date("con efectos del día 27 de\u{a0}octubre de\u{a0}2019.").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2019, 10, 27));
/// assert_eq!(parse_date("no date here").unwrap(), None);
/// ```
pub fn parse_date(text: &str) -> Result<Option<NaiveDate>, DateParseError> {
    let normalized: String = text.nfkd().collect();

    let Some(caps) = PROSE_DATE_PATTERN.captures(&normalized) else {
        return Ok(None);
    };

    let month = month_number(&caps["month"])?;
    // Both groups are bounded ASCII digit runs, so these parses cannot overflow.
    let day: u32 = caps["day"].parse().unwrap_or_default();
    let year: i32 = caps["year"].parse().unwrap_or_default();

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or(DateParseError::InvalidDate { day, month, year })
}

/// Parse a structured `YYYYMMDD` date such as `fecha_disposicion`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use boe_harvester::date::parse_compact_date;
///
/// assert_eq!(
///     parse_compact_date("20190531").unwrap(),
///     NaiveDate::from_ymd_opt(2019, 5, 31).unwrap()
/// );
/// assert!(parse_compact_date("2019-05-31").is_err());
/// ```
pub fn parse_compact_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::InvalidCompactDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| DateParseError::InvalidCompactDate(value.to_string()))
}
