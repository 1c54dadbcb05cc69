//! Dimension joining
//!
//! Transactions are the driving side of every join: each transaction row
//! appears exactly once in the fact table whether or not its customer or
//! product reference resolves. Dimension lookups go through a
//! `DimensionIndex`, which keeps the FIRST occurrence of each key and
//! reports duplicates instead of fanning rows out the way a naive merge
//! would.

use crate::error::{EngineError, Result};
use crate::records::RawRecordSet;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

/// First-match lookup index over one dimension extract.
pub struct DimensionIndex<'a> {
    records: &'a RawRecordSet,
    by_key: HashMap<String, usize>,
}

impl<'a> DimensionIndex<'a> {
    /// Build the index over `key_column`. Duplicate keys keep their first
    /// occurrence; the condition is logged once per dimension.
    pub fn build(records: &'a RawRecordSet, key_column: &str) -> Result<Self> {
        let key_idx = records.require_column(key_column)?;

        let mut by_key = HashMap::new();
        let mut duplicate_keys: Vec<String> = Vec::new();

        for row in 0..records.len() {
            let key = records.cell(row, key_idx);
            if key.is_empty() {
                continue;
            }
            match by_key.entry(key.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(_) => {
                    duplicate_keys.push(key.to_string());
                }
            }
        }

        if !duplicate_keys.is_empty() {
            duplicate_keys.sort();
            duplicate_keys.dedup();
            warn!(
                dimension = records.name.as_str(),
                key_column,
                duplicates = duplicate_keys.len(),
                sample = duplicate_keys.first().map(String::as_str).unwrap_or(""),
                "duplicate dimension keys; keeping first occurrence of each"
            );
        }

        Ok(Self { records, by_key })
    }

    /// Row index of the first occurrence of `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Attribute of the matched dimension row. Empty cells read as null.
    pub fn attribute(&self, row: usize, column_idx: usize) -> Option<String> {
        let cell = self.records.cell(row, column_idx);
        if cell.is_empty() {
            None
        } else {
            Some(cell.to_string())
        }
    }
}

/// Read a mandatory join key cell from the transactions extract.
///
/// The column's existence is checked by the caller; an empty VALUE in a
/// transaction row is a structural error as well.
pub fn require_key_cell(
    transactions: &RawRecordSet,
    row: usize,
    key_idx: usize,
    key_column: &str,
) -> Result<String> {
    let cell = transactions.cell(row, key_idx);
    if cell.is_empty() {
        return Err(EngineError::MissingJoinKey {
            detail: format!(
                "transaction row {} has no value for join key '{}'",
                row, key_column
            ),
        });
    }
    Ok(cell.to_string())
}

/// Missing-column errors on the driving side are join-key errors, not plain
/// schema errors.
pub fn require_key_column(transactions: &RawRecordSet, key_column: &str) -> Result<usize> {
    transactions
        .column_index(key_column)
        .ok_or_else(|| EngineError::MissingJoinKey {
            detail: format!(
                "transactions extract '{}' lacks the join key column '{}'",
                transactions.name, key_column
            ),
        })
}
