//! Error types for the export pipeline.

use exportdash_sheet::SheetError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can abort a pipeline run.
///
/// Rows with unparseable periods, non-numeric values or missing fields are
/// filtered rather than reported; the only structural failure is a header
/// that does not contain the time column.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The flattened header has no column matching the configured time column.
    #[error("Malformed header: time column '{expected}' not found (columns: {found:?})")]
    MalformedHeader {
        expected: String,
        found: Vec<String>,
    },

    /// Loading the spreadsheet failed.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a malformed header error.
    pub fn malformed_header(expected: impl Into<String>, found: &[String]) -> Self {
        Self::MalformedHeader {
            expected: expected.into(),
            found: found.to_vec(),
        }
    }
}
