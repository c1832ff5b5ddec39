//! End-to-end pipeline driver.

use crate::clean::clean;
use crate::config::PipelineOptions;
use crate::error::PipelineResult;
use crate::header::normalize_headers;
use crate::period::filter_periods;
use crate::tidy::TidyTable;
use crate::unpivot::unpivot;
use exportdash_sheet::RawTable;
use std::path::Path;

/// Run every transformation stage over an already loaded table.
///
/// # Errors
///
/// Fails only when the header has no time column.
pub fn run_pipeline(raw: RawTable, options: &PipelineOptions) -> PipelineResult<TidyTable> {
    tracing::info!(
        "Running pipeline over {} rows x {} columns",
        raw.row_count(),
        raw.col_count()
    );

    let flat = normalize_headers(raw, options)?;
    let periods = filter_periods(flat);
    let long = unpivot(periods);
    let tidy = clean(long);

    tracing::info!("Pipeline produced {} tidy records", tidy.len());
    Ok(tidy)
}

/// Load a spreadsheet export and run the pipeline over it.
pub fn load_tidy(path: impl AsRef<Path>, options: &PipelineOptions) -> PipelineResult<TidyTable> {
    let path = path.as_ref();
    tracing::info!("Loading {}", path.display());
    let raw = RawTable::load(path, &options.load)?;
    run_pipeline(raw, options)
}
