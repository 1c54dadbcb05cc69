//! Analysis session - the interface the presentation layer talks to
//!
//! Owns the current fact table and filter state. The presentation layer
//! ingests once per upload event, then repeatedly mutates the filter and
//! re-reads aggregates and KPI cards; every read is computed against the
//! full table narrowed by the current criteria, never against a previously
//! narrowed subset.

use crate::aggregate::{self, AggregateRequest, AggregateRow};
use crate::error::Result;
use crate::fact::FactTable;
use crate::filter::FilterCriteria;
use crate::ingest::{ingest, SourceBundle};
use tracing::info;

#[derive(Debug, Default)]
pub struct AnalysisSession {
    fact_table: Option<FactTable>,
    filter: FilterCriteria,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a new upload, replacing the previous dataset wholesale.
    ///
    /// All-or-nothing: on failure the previous fact table (if any) stays
    /// untouched and remains the visible dataset. On success the filter is
    /// reset to its initial state, year pinned to the most recent year
    /// present.
    pub fn ingest(&mut self, bundle: &SourceBundle) -> Result<&FactTable> {
        let table = ingest(bundle)?;

        self.filter = FilterCriteria {
            year: table.latest_year(),
            ..FilterCriteria::unconstrained()
        };
        info!(
            rows = table.len(),
            initial_year = ?self.filter.year,
            "session dataset replaced"
        );

        Ok(self.fact_table.insert(table))
    }

    /// The full (unfiltered) fact table of the current session, if any.
    pub fn fact_table(&self) -> Option<&FactTable> {
        self.fact_table.as_ref()
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    // Filter slot mutations. Passing `None` resets a slot to "all".

    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.filter = criteria;
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.filter.year = year;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category;
    }

    pub fn set_payment_method(&mut self, payment_method: Option<String>) {
        self.filter.payment_method = payment_method;
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterCriteria::unconstrained();
    }

    /// The current filtered view. Empty when nothing was ingested yet.
    pub fn filtered(&self) -> FactTable {
        match &self.fact_table {
            Some(table) => self.filter.apply(table),
            None => FactTable::default(),
        }
    }

    pub fn aggregate(&self, request: &AggregateRequest) -> Vec<AggregateRow> {
        aggregate::aggregate(&self.filtered(), request)
    }

    // KPI cards, computed over the filtered view

    pub fn total_amount(&self) -> f64 {
        aggregate::total_amount(&self.filtered())
    }

    pub fn distinct_transaction_count(&self) -> usize {
        aggregate::distinct_transaction_count(&self.filtered())
    }

    pub fn average_ticket(&self) -> f64 {
        aggregate::average_ticket(&self.filtered())
    }

    pub fn distinct_customer_count(&self) -> usize {
        aggregate::distinct_customer_count(&self.filtered())
    }

    /// KPI cards plus the observed filter domains, as one JSON document for
    /// the presentation layer.
    pub fn snapshot_json(&self) -> serde_json::Value {
        let filtered = self.filtered();
        let domains = self.fact_table.as_ref();

        serde_json::json!({
            "total_amount": aggregate::total_amount(&filtered),
            "distinct_transactions": aggregate::distinct_transaction_count(&filtered),
            "average_ticket": aggregate::average_ticket(&filtered),
            "distinct_customers": aggregate::distinct_customer_count(&filtered),
            "filter": self.filter,
            "years": domains.map(|t| t.years()).unwrap_or_default(),
            "categories": domains.map(|t| t.categories()).unwrap_or_default(),
            "payment_methods": domains.map(|t| t.payment_methods()).unwrap_or_default(),
        })
    }
}
