//! Spreadsheet loading for exportdash
//!
//! Reads quarterly export spreadsheets whose first two rows form a two-level
//! column header (outer label such as a country, inner label such as a
//! product) into a [`RawTable`].
//!
//! # Examples
//!
//! ```
//! use exportdash_sheet::{CellValue, CsvOptions, HeaderOptions, RawTable};
//!
//! let csv = " ,USA,\ndatetime,Chemicals,Plastics\n2021Q1,100,200\n";
//! let table = RawTable::from_csv_str(csv, &CsvOptions::default(), &HeaderOptions::default())
//!     .unwrap();
//!
//! assert_eq!(table.col_count(), 3);
//! // The merged "USA" label is carried over to the Plastics column
//! assert_eq!(table.headers()[2].outer, "USA");
//! assert_eq!(table.rows()[0][1], CellValue::Int(100));
//! ```
//!
//! Workbooks (`.xls`, `.xlsx`, `.ods`) are read through `calamine`:
//!
//! ```no_run
//! use exportdash_sheet::{LoadOptions, RawTable};
//!
//! let table = RawTable::load("data/TWsalesamount.xls", &LoadOptions::default()).unwrap();
//! ```

mod cell;
mod csv;
mod error;
mod raw;
mod workbook;

/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export the two-level header table.
pub use raw::{HeaderOptions, HeaderPair, RawTable};
/// Re-export load options.
pub use workbook::LoadOptions;
