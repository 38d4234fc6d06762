//! Cell parsing for statement tables.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::FinstatError;
use crate::types::{FiscalYear, Money};
use crate::FinstatResult;

const CURRENCY_SYMBOLS: [char; 5] = ['$', '₹', '€', '£', '¥'];

/// Parse a reported amount.
///
/// Accepts thousands separators in either Western (`1,000,000`) or Indian
/// (`10,00,000`) grouping, parenthesised negatives (`(5,000)`), a leading
/// currency symbol, and surrounding whitespace.
pub fn parse_amount(raw: &str) -> FinstatResult<Money> {
    let mut s = raw.trim();
    if s.is_empty() {
        return Err(FinstatError::invalid("amount", "Empty value"));
    }

    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim_start();
    }
    s = s.trim_start_matches(|c: char| CURRENCY_SYMBOLS.contains(&c)).trim_start();

    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| FinstatError::invalid("amount", format!("Not a number: '{}'", raw.trim())))?;

    Ok(if negative { -value } else { value })
}

/// Parse a fiscal-year label into the year the period closes in.
///
/// `2023`, `FY2023`, `FY 23`, `FY-23`, `2022-23` and `2022-2023` all give 2023.
pub fn parse_fiscal_year(raw: &str) -> FinstatResult<FiscalYear> {
    let s = raw.trim();
    let err = || FinstatError::invalid("year", format!("Unrecognised fiscal year: '{s}'"));

    let body = match s.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("fy") => s[2..].trim_start_matches([' ', '-']),
        _ => s,
    };

    // Spreadsheets often hand years over as "2023.0".
    let body = body.strip_suffix(".0").unwrap_or(body);

    let closing = match body.split_once(['-', '–', '/']) {
        Some((start, end)) => {
            let start: FiscalYear = start.trim().parse().map_err(|_| err())?;
            let end = end.trim();
            match end.len() {
                4 => end.parse::<FiscalYear>().map_err(|_| err())?,
                2 => {
                    let yy: FiscalYear = end.parse().map_err(|_| err())?;
                    let year = start
                        .checked_sub(start.rem_euclid(100))
                        .and_then(|century| century.checked_add(yy))
                        .ok_or_else(err)?;
                    if year < start {
                        year.checked_add(100).ok_or_else(err)?
                    } else {
                        year
                    }
                }
                _ => return Err(err()),
            }
        }
        None => match body.len() {
            4 => body.parse::<FiscalYear>().map_err(|_| err())?,
            2 => 2000 + body.parse::<FiscalYear>().map_err(|_| err())?,
            _ => return Err(err()),
        },
    };

    Ok(closing)
}
