//! # exportdash-core
//!
//! Turns a quarterly export spreadsheet with a two-row header into a tidy
//! table of `(date, country, product, value)` records.
//!
//! The pipeline runs five stages in order:
//! - load the two-level header table (`exportdash-sheet`)
//! - flatten header labels and locate the time column ([`header`])
//! - keep rows with `YYYYQn` labels and convert them to dates ([`period`])
//! - melt country/product columns into rows ([`unpivot`])
//! - drop incomplete rows and relabel products ([`clean`])
//!
//! ```
//! use exportdash_core::{run_pipeline, PipelineOptions};
//! use exportdash_sheet::{CsvOptions, HeaderOptions, RawTable};
//!
//! let csv = " ,USA\ndatetime,化學品\nTitle row,\n2021Q1,100\n";
//! let raw = RawTable::from_csv_str(csv, &CsvOptions::default(), &HeaderOptions::default())
//!     .unwrap();
//! let tidy = run_pipeline(raw, &PipelineOptions::default()).unwrap();
//!
//! assert_eq!(tidy.len(), 1);
//! assert_eq!(tidy.records()[0].product, "Chemicals");
//! ```

/// Pipeline result memoization.
pub mod cache;
/// Cleaning and product relabeling.
pub mod clean;
/// Configuration file and pipeline options.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Header flattening.
pub mod header;
/// Quarter parsing and the period filter.
pub mod period;
/// Pipeline driver.
pub mod pipeline;
/// Tidy output table.
pub mod tidy;
/// Wide-to-long reshaping.
pub mod unpivot;

pub use cache::{PipelineCache, SourceFingerprint};
pub use clean::{clean, relabel_product, PRODUCT_TRANSLATIONS};
pub use config::{Config, DashboardConfig, InputConfig, PipelineOptions};
pub use error::{PipelineError, PipelineResult};
pub use header::{flatten_headers, normalize_headers, FlatTable};
pub use period::{filter_periods, parse_quarter, PeriodParse, PeriodTable, Quarter};
pub use pipeline::{load_tidy, run_pipeline};
pub use tidy::{TidyRecord, TidyTable};
pub use unpivot::{split_composite_key, unpivot, LongRow, LongTable};
