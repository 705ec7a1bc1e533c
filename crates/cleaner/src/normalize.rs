//! Field-level parsing helpers shared by the raw and canonical readers.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

// Tried in order; the first layout that parses to a plausible year wins.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d-%m-%Y",
];

/// Normalises a column header for lookup: lowercase, no spaces, dashes or underscores.
pub fn header_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// "MAHARASHTRA" -> "Maharashtra", "tamil  nadu" -> "Tamil Nadu".
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Trimmed value, or `sentinel` when blank.
pub fn or_sentinel(raw: &str, sentinel: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value.to_string()
    }
}

// chrono's `%Y` accepts one to four digits, so "05-02-22" would otherwise
// read as year 5 under the ISO layout.
const MIN_YEAR: i32 = 1000;

/// Parses an order date. A trailing time component is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split_whitespace().next()?;
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(date_part, format)
            .ok()
            .filter(|date| date.year() >= MIN_YEAR)
    })
}

/// Parses a monetary amount. Blank means zero; thousands separators are allowed.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parses a unit count. Blank means zero; integral decimals such as "2.0" are accepted.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(0);
    }
    if let Ok(qty) = value.parse::<u32>() {
        return Some(qty);
    }
    let decimal = Decimal::from_str(value).ok()?;
    if decimal.fract().is_zero() && decimal >= Decimal::ZERO {
        decimal.to_u32()
    } else {
        None
    }
}

/// Parses a boolean flag. Blank means `false`; unknown spellings yield `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Some(false),
        "true" | "1" | "yes" | "y" => Some(true),
        _ => None,
    }
}
