//! Error types for chart generation.

use thiserror::Error;

/// Result type for chart operations.
pub type VizResult<T> = Result<T, VizError>;

/// Errors raised while building or serializing charts.
#[derive(Debug, Error)]
pub enum VizError {
    /// Every comparison item was deselected.
    #[error("Select at least one product (or Total) to compare")]
    EmptySelection,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while writing rendered output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
