//! Raw record sets - Tabular payloads as uploaded, before normalization
//!
//! A `RawRecordSet` wraps one uploaded CSV payload and converts it into an
//! ordered sequence of string rows with named columns. It lives only for the
//! duration of the ingestion run that created it; once the fact table is
//! built the record sets are discarded.

use crate::error::{EngineError, Result};
use csv::ReaderBuilder;

/// One uploaded tabular extract (e.g. "vendas", "clientes", "produtos").
#[derive(Debug, Clone)]
pub struct RawRecordSet {
    /// Logical name of the source, used in error and log messages
    pub name: String,

    /// Trimmed header row, in file order
    pub headers: Vec<String>,

    /// Cell values, row-major, in file order. Short rows are padded with
    /// empty strings so every row has one cell per header.
    pub rows: Vec<Vec<String>>,
}

impl RawRecordSet {
    /// Parse a fully-buffered CSV payload.
    ///
    /// The payload must carry a header row. Rows with fewer cells than the
    /// header are padded; extra trailing cells are dropped.
    pub fn from_csv_bytes(name: &str, payload: &[u8]) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(payload);

        let headers = rdr
            .headers()
            .map_err(|e| EngineError::Csv {
                table: name.to_string(),
                source: e,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| EngineError::Csv {
                table: name.to_string(),
                source: e,
            })?;

            let mut row = Vec::with_capacity(headers.len());
            for idx in 0..headers.len() {
                row.push(record.get(idx).unwrap_or("").trim().to_string());
            }
            rows.push(row);
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a column that the schema contract requires.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| EngineError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Cell value at (row, column index). Out-of-range access yields "".
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}
