use chrono::{Duration, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

/// Statement exports with a single signed debit/credit column mark debits
/// with '-' and credits with '+'. A malformed or unsigned cell yields zero
/// for both sides: it is treated as "no transaction amount" rather than
/// aborting the row.
pub(crate) fn extract_debit(raw: &str) -> Decimal {
    let cleaned = clean_amount(raw);
    match cleaned.strip_prefix('-') {
        Some(magnitude) => magnitude.parse::<Decimal>().unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

pub(crate) fn extract_credit(raw: &str) -> Decimal {
    let cleaned = clean_amount(raw);
    match cleaned.strip_prefix('+') {
        Some(value) => value.parse::<Decimal>().unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

/// Balance cells carry no sign encoding; any parseable number is kept,
/// everything else becomes None.
pub(crate) fn parse_balance(raw: &str) -> Option<Decimal> {
    let cleaned = clean_amount(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Strip whitespace, thousands separators and currency glyphs.
fn clean_amount(raw: &str) -> String {
    raw.replace(['₦', '$', '£', '€', ','], "").trim().to_string()
}

lazy_static! {
    static ref ISO_DATETIME: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref DDMMYYYY: Regex = Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap();
    static ref DDMMMYYYY: Regex = Regex::new(r"^\d{1,2} [a-zA-Z]{3} \d{4}$").unwrap();
    static ref SERIAL: Regex = Regex::new(r"^\d{5}(\.\d+)?$").unwrap();
}

/// Parse a calendar date across the representations seen in statement
/// exports: ISO dates, ISO datetimes, `DD/MM/YYYY`, `D Mon YYYY` and
/// numeric spreadsheet serials. Historical exports contain rows with
/// missing or mangled dates, so failure is recorded as None, not an error.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if ISO_DATETIME.is_match(s) {
        let head = &s[0..19];
        return NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .map(|dt| dt.date());
    }
    if ISO_DATE.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }
    if DDMMYYYY.is_match(s) {
        return NaiveDate::parse_from_str(s, "%d/%m/%Y").ok();
    }
    if DDMMMYYYY.is_match(s) {
        return NaiveDate::parse_from_str(s, "%d %b %Y").ok();
    }
    if SERIAL.is_match(s) {
        let days = match s.split('.').next() {
            Some(integer_part) => integer_part.parse::<i64>().ok()?,
            None => return None,
        };
        return serial_to_date(days);
    }

    None
}

/// Spreadsheet serial dates count days from 1899-12-30. Serials outside
/// 1984..2050 are rejected rather than mapped to absurd dates.
fn serial_to_date(serial: i64) -> Option<NaiveDate> {
    if !(31_000..=55_000).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30).map(|epoch| epoch + Duration::days(serial))
}

/// Channel labels are stored uppercase. Blank cells and the "NAN"
/// placeholder left behind by upstream tooling become UNKNOWN.
pub(crate) fn normalize_channel(raw: &str) -> String {
    let cleaned = raw.trim().to_uppercase();
    if cleaned.is_empty() || cleaned == "NAN" {
        "UNKNOWN".to_string()
    } else {
        cleaned
    }
}
