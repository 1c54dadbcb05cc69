//! Numeric and date normalization
//!
//! Sales extracts arrive with Brazilian locale encodings: monetary values
//! use `.` as the thousands separator and `,` as the decimal separator
//! (`"1.234,56"`), dates are day-first (`"05/03/2024"`). This module turns
//! those strings into canonical `f64` amounts and `chrono::NaiveDate`
//! values. All transforms are pure and preserve row order and row count;
//! the first unparseable cell aborts the whole ingestion.

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CURRENCY_PREFIX: Regex = Regex::new(r"^(R\$|\$)\s*").unwrap();
}

/// Parse one monetary cell into a non-negative amount rounded to cents.
///
/// A string containing a comma is treated as BR-locale (`"1.234,56"`);
/// otherwise it is taken as a pre-parsed decimal (`"1234.56"`).
pub fn parse_monetary(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped = CURRENCY_PREFIX.replace(trimmed, "");
    let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    let canonical = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };

    let value: f64 = canonical.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    Some(round_to_cents(value))
}

/// Parse one date cell using the day-first convention.
///
/// Accepted shapes: `DD/MM/YYYY`, `DD-MM-YYYY` and ISO `YYYY-MM-DD`.
/// Ambiguous strings like `01/02/2024` resolve day-first (1 February).
pub fn parse_date_dayfirst(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    None
}

/// Parse one quantity cell into a non-negative integer.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalize a whole monetary column, keeping row order and count.
pub fn monetary_column(table: &str, column: &str, cells: &[&str]) -> Result<Vec<f64>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            parse_monetary(raw).ok_or_else(|| EngineError::ValueConversion {
                table: table.to_string(),
                column: column.to_string(),
                row,
                value: (*raw).to_string(),
            })
        })
        .collect()
}

/// Normalize a whole date column, keeping row order and count.
pub fn date_column(table: &str, column: &str, cells: &[&str]) -> Result<Vec<NaiveDate>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            parse_date_dayfirst(raw).ok_or_else(|| EngineError::DateConversion {
                table: table.to_string(),
                column: column.to_string(),
                row,
                value: (*raw).to_string(),
            })
        })
        .collect()
}
