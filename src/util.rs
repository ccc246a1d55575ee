// Parsing and formatting helpers.
//
// Number and month handling lives here so the rest of the code can work
// with clean, typed values.
use crate::error::{ReportError, Result};
use crate::types::Quarter;
use chrono::Month;
use num_format::{Locale, ToFormattedString};

/// Parse a spend cell into `u64` while forgiving the formatting noise that
/// spreadsheet exports tend to add.
///
/// - Accepts `Option<&str>` so callers can pass optional fields through.
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Rejects a leading `-`, so negative amounts come back `None`.
/// - Returns `None` for anything that cannot be parsed.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    // `u64::from_str` refuses a leading `-`, which is what keeps amounts
    // non-negative.
    s.parse::<u64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Calendar number (1..=12) of a month label such as "March 2024" or
/// "march".
///
/// Only the first word is looked at, and it must be a full English month
/// name (any case). Abbreviations like "Sept" return `None`.
pub fn month_ordinal(label: &str) -> Option<u32> {
    // The Month column carries the year too ("March 2024"); drop it.
    let name = label.split_whitespace().next()?;
    // `chrono::Month` knows the canonical names; walk all twelve rather than
    // using its `FromStr`, which also accepts three-letter forms.
    (1u8..=12)
        .filter_map(|n| Month::try_from(n).ok())
        .find(|m| m.name().eq_ignore_ascii_case(name))
        .map(|m| m.number_from_month())
}

/// Fixed calendar bucket of a month label: Jan-Mar Q1, Apr-Jun Q2,
/// Jul-Sep Q3, Oct-Dec Q4.
pub fn quarter(label: &str) -> Result<Quarter> {
    match month_ordinal(label) {
        Some(1..=3) => Ok(Quarter::Q1),
        Some(4..=6) => Ok(Quarter::Q2),
        Some(7..=9) => Ok(Quarter::Q3),
        Some(10..=12) => Ok(Quarter::Q4),
        _ => Err(ReportError::UnknownMonth(label.to_string())),
    }
}

/// Percentage of `part` in `whole`; `None` when `whole` is zero.
pub fn share_pct(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 / whole as f64 * 100.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` thousands separators (1,234,567.89).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Values that round to zero print without a sign.
    let is_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Whole-dollar amount with separators, e.g. `$1,234,567`.
pub fn format_dollars(n: f64) -> String {
    let s = format_number(n, 0);
    match s.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", s),
    }
}

/// Compact dollar amount: `$1.25M`, `$350K`, `$12.5B`, `$999`.
pub fn format_compact(value: f64) -> String {
    fn trim(num: f64) -> String {
        let s = format!("{:.2}", num);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        s.to_string()
    }
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("${}B", trim(value / 1_000_000_000.0))
    } else if abs >= 1_000_000.0 {
        format!("${}M", trim(value / 1_000_000.0))
    } else if abs >= 1_000.0 {
        format!("${}K", trim(value / 1_000.0))
    } else {
        format!("${}", trim(value))
    }
}
