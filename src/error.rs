use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("missing required column `{0}` in header")]
    MissingColumn(&'static str),

    #[error("row {row}: cannot parse {column} value {value:?} as a non-negative integer")]
    MalformedRow {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("unknown month name {0:?}")]
    UnknownMonth(String),

    #[error("growth from {from} to {to} is undefined: {from} total is zero")]
    DivisionUndefined { from: i32, to: i32 },

    #[error("total spend for {bank} overflows at a {year} row")]
    AmountOverflow { bank: String, year: i32 },

    #[error("failed to write export to {}: {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
