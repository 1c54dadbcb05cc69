//! Filter state
//!
//! A triple of optional predicates over the fact table: year, category and
//! payment method. Each slot is either unconstrained (`None`) or pinned to
//! one observed value. Applying the criteria always starts from the FULL
//! fact table, so the result is independent of the order in which slots
//! were set.

use crate::fact::{FactRow, FactTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub year: Option<i32>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
}

impl FilterCriteria {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    fn matches(&self, row: &FactRow) -> bool {
        if let Some(year) = self.year {
            if row.year != year {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if row.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(method) = &self.payment_method {
            if row.payment_method != *method {
                return false;
            }
        }
        true
    }

    /// Narrow the table to the rows matching every constrained slot.
    /// The input table is never mutated.
    pub fn apply(&self, table: &FactTable) -> FactTable {
        FactTable {
            rows: table
                .rows
                .iter()
                .filter(|row| self.matches(row))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::month_label;
    use chrono::NaiveDate;

    fn row(id: &str, year: i32, category: &str, method: &str) -> FactRow {
        FactRow {
            transaction_id: id.to_string(),
            customer_id: "C1".to_string(),
            customer_name: None,
            product_id: "P1".to_string(),
            product_name: None,
            category: Some(category.to_string()),
            quantity: 1,
            amount: 100.0,
            payment_method: method.to_string(),
            sale_date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            year,
            month: 1,
            month_label: month_label(1).to_string(),
            salesperson_id: None,
            salesperson_name: None,
            region_id: None,
            region_name: None,
        }
    }

    fn table() -> FactTable {
        FactTable {
            rows: vec![
                row("V1", 2024, "Eletrônicos", "Pix"),
                row("V2", 2024, "Livros", "Cartão"),
                row("V3", 2023, "Eletrônicos", "Pix"),
            ],
        }
    }

    #[test]
    fn unconstrained_keeps_everything() {
        let narrowed = FilterCriteria::unconstrained().apply(&table());
        assert_eq!(narrowed.len(), 3);
    }

    #[test]
    fn slots_combine_with_logical_and() {
        let criteria = FilterCriteria {
            year: Some(2024),
            category: Some("Eletrônicos".to_string()),
            payment_method: None,
        };
        let narrowed = criteria.apply(&table());
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.rows[0].transaction_id, "V1");
    }

    #[test]
    fn filtering_is_commutative_across_slots() {
        let full = table();

        let year_first = FilterCriteria {
            year: Some(2024),
            ..Default::default()
        }
        .apply(&full);
        let year_then_category = FilterCriteria {
            year: Some(2024),
            category: Some("Eletrônicos".to_string()),
            ..Default::default()
        }
        .apply(&full);

        let category_first = FilterCriteria {
            category: Some("Eletrônicos".to_string()),
            ..Default::default()
        }
        .apply(&full);
        let combined = FilterCriteria {
            year: Some(2024),
            category: Some("Eletrônicos".to_string()),
            ..Default::default()
        }
        .apply(&full);

        // Re-application always starts from the full table; intersecting in
        // either order equals the combined criterion.
        assert_eq!(year_then_category, combined);
        assert!(year_first.len() >= combined.len());
        assert!(category_first.len() >= combined.len());
    }

    #[test]
    fn rows_without_category_never_match_a_category_filter() {
        let mut t = table();
        t.rows[0].category = None;
        let criteria = FilterCriteria {
            category: Some("Eletrônicos".to_string()),
            ..Default::default()
        };
        let narrowed = criteria.apply(&t);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.rows[0].transaction_id, "V3");
    }
}
