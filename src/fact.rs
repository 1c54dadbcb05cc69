//! Fact table data model
//!
//! The fact table is the flat, joined, derived dataset every aggregate view
//! operates over. It is built once per ingestion run and never mutated
//! afterwards; filters derive narrowed copies instead.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One denormalized sale: a transaction row joined with its customer and
/// product attributes plus the derived calendar dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub transaction_id: String,
    pub customer_id: String,
    /// Null when the customer id has no match in the customers extract
    pub customer_name: Option<String>,
    pub product_id: String,
    /// Null when the product id has no match in the products extract
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub quantity: u32,
    /// Non-negative, canonicalized to two decimal places
    pub amount: f64,
    pub payment_method: String,
    pub sale_date: chrono::NaiveDate,
    pub year: i32,
    /// 1-12, consistent with `sale_date`
    pub month: u32,
    pub month_label: String,
    pub salesperson_id: Option<String>,
    pub salesperson_name: Option<String>,
    pub region_id: Option<String>,
    pub region_name: Option<String>,
}

/// All fact rows produced by one ingestion run, in transaction-file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactTable {
    pub rows: Vec<FactRow>,
}

impl FactTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years observed, ascending. Drives the year selector.
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).sorted().dedup().collect()
    }

    /// Most recent year present, if any.
    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().map(|r| r.year).max()
    }

    /// Distinct category labels observed, ascending.
    pub fn categories(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.category.clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// Distinct payment method labels observed, ascending.
    pub fn payment_methods(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.payment_method.clone())
            .sorted()
            .dedup()
            .collect()
    }
}
