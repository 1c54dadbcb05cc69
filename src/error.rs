use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Schema error: required column '{column}' is missing from {table}")]
    MissingColumn { table: String, column: String },

    #[error("Join key error: {detail}")]
    MissingJoinKey { detail: String },

    #[error("Value conversion error in {table}.{column} (row {row}): cannot parse '{value}'")]
    ValueConversion {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("Date conversion error in {table}.{column} (row {row}): cannot parse '{value}' as a day-first date")]
    DateConversion {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("CSV error while reading {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
