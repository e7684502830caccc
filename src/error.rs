//! Error type shared by the parsing and analysis engines.
//!
//! Sparse or malformed data never produces an error: it degrades to empty
//! tables, omitted columns or `None` results. Only structural faults surface
//! here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A caller broke an input contract, e.g. regression vectors of unequal length.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),
    #[error("unable to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("unable to read delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to decode text with encoding {encoding}")]
    Decode { encoding: &'static str },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
