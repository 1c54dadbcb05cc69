//! Aggregation engine
//!
//! Computes grouped sums, distinct-transaction counts and means over an
//! (already filtered) fact table, plus the scalar KPIs shown on the
//! dashboard cards. Aggregation is a pure function of the table and the
//! request: identical inputs produce identical output, ordering included.
//!
//! Ordering contract:
//! - month groups come back in calendar order (`Jan..Dez` by month number);
//! - product and payment-method groups come back descending by the metric,
//!   ties broken by first-encountered order, with optional top-N truncation.

use crate::fact::FactTable;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Group label for fact rows whose product reference had no match.
/// An unmatched product is a first-class group, never a dropped row.
pub const UNMATCHED_PRODUCT_LABEL: &str = "(não cadastrado)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    Month,
    Product,
    PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    SumAmount,
    CountDistinctTransactions,
    MeanAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub group_by: GroupBy,
    pub metric: Metric,
    /// Truncate after ordering; only meaningful for ranking groups.
    pub top_n: Option<usize>,
}

/// One group of the requested view: label plus metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub label: String,
    pub value: f64,
}

struct GroupAcc {
    label: String,
    /// Month number for calendar ordering; 0 for ranking groups
    month: u32,
    sum: f64,
    transaction_ids: HashSet<String>,
}

impl GroupAcc {
    fn metric_value(&self, metric: Metric) -> f64 {
        let count = self.transaction_ids.len();
        match metric {
            Metric::SumAmount => self.sum,
            Metric::CountDistinctTransactions => count as f64,
            Metric::MeanAmount => {
                if count == 0 {
                    0.0
                } else {
                    self.sum / count as f64
                }
            }
        }
    }
}

/// Compute the requested view over `table` (normally the filtered table).
pub fn aggregate(table: &FactTable, request: &AggregateRequest) -> Vec<AggregateRow> {
    let mut order: Vec<GroupAcc> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    // Single grouping pass, groups created in first-encountered order
    for row in &table.rows {
        let (key, label, month) = match request.group_by {
            GroupBy::Month => (
                row.month.to_string(),
                row.month_label.clone(),
                row.month,
            ),
            GroupBy::Product => {
                let label = row
                    .product_name
                    .clone()
                    .unwrap_or_else(|| UNMATCHED_PRODUCT_LABEL.to_string());
                (label.clone(), label, 0)
            }
            GroupBy::PaymentMethod => (row.payment_method.clone(), row.payment_method.clone(), 0),
        };

        let slot = *index.entry(key).or_insert_with(|| {
            order.push(GroupAcc {
                label,
                month,
                sum: 0.0,
                transaction_ids: HashSet::new(),
            });
            order.len() - 1
        });

        let acc = &mut order[slot];
        acc.sum += row.amount;
        acc.transaction_ids.insert(row.transaction_id.clone());
    }

    match request.group_by {
        GroupBy::Month => {
            // Calendar order, never alphabetical by label
            order.sort_by_key(|acc| acc.month);
        }
        GroupBy::Product | GroupBy::PaymentMethod => {
            // Stable sort: ties keep first-encountered order
            order.sort_by(|a, b| {
                b.metric_value(request.metric)
                    .partial_cmp(&a.metric_value(request.metric))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    let mut rows: Vec<AggregateRow> = order
        .into_iter()
        .map(|acc| AggregateRow {
            value: acc.metric_value(request.metric),
            label: acc.label,
        })
        .collect();

    if let Some(n) = request.top_n {
        rows.truncate(n);
    }

    rows
}

/// Sum of amounts over the table. Zero when empty.
pub fn total_amount(table: &FactTable) -> f64 {
    table.rows.iter().map(|r| r.amount).sum()
}

/// Number of distinct transaction ids.
pub fn distinct_transaction_count(table: &FactTable) -> usize {
    table
        .rows
        .iter()
        .map(|r| r.transaction_id.as_str())
        .unique()
        .count()
}

/// Mean amount per distinct transaction. Zero when the table is empty.
pub fn average_ticket(table: &FactTable) -> f64 {
    let count = distinct_transaction_count(table);
    if count == 0 {
        0.0
    } else {
        total_amount(table) / count as f64
    }
}

/// Number of distinct customer ids.
pub fn distinct_customer_count(table: &FactTable) -> usize {
    table
        .rows
        .iter()
        .map(|r| r.customer_id.as_str())
        .unique()
        .count()
}
