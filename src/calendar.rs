//! Calendar dimension derivation
//!
//! Derives year, month number and the PT-BR month label from a normalized
//! sale date. The label vocabulary is fixed and ordered; charts grouped by
//! month must follow calendar order, not the alphabetical order of labels.

use chrono::{Datelike, NaiveDate};

/// Twelve three-letter PT-BR month abbreviations, indexed by month - 1.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Calendar attributes derived from a sale date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarParts {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub month_label: &'static str,
}

/// Derive the calendar dimensions of a valid date. Total: every date the
/// normalizer accepts has a well-defined year and month.
pub fn derive(date: NaiveDate) -> CalendarParts {
    let month = date.month();
    CalendarParts {
        year: date.year(),
        month,
        month_label: MONTH_LABELS[(month - 1) as usize],
    }
}

pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS[(month.clamp(1, 12) - 1) as usize]
}
