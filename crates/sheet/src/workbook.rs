use crate::cell::CellValue;
use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::raw::{HeaderOptions, RawTable};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Options for loading a spreadsheet export
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Worksheet to read; the first sheet when unset
    pub sheet: Option<String>,
    /// How the two header rows are interpreted
    pub header: HeaderOptions,
    /// Reader options used for `.csv`/`.tsv` inputs
    pub csv: CsvOptions,
}

impl LoadOptions {
    /// Select a worksheet by name
    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Replace the header options
    #[must_use]
    pub fn with_header(mut self, header: HeaderOptions) -> Self {
        self.header = header;
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel serial date; quarter labels are text so this never reaches the period filter
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

impl RawTable {
    /// Load a two-row-header table from any workbook format calamine
    /// understands (xls, xlsx, xlsb, ods).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the sheet is missing, or
    /// it has fewer than two rows.
    pub fn from_workbook<P: AsRef<Path>>(
        path: P,
        sheet: Option<&str>,
        header: &HeaderOptions,
    ) -> Result<Self> {
        let mut workbook = open_workbook_auto(path.as_ref())?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet {
            Some(name) => {
                if !sheet_names.iter().any(|s| s == name) {
                    return Err(SheetError::SheetNotFound {
                        name: name.to_string(),
                    });
                }
                name.to_string()
            }
            None => sheet_names.first().cloned().ok_or(SheetError::EmptyWorkbook)?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect();

        tracing::debug!(
            "Read {} rows from sheet '{}' of {}",
            grid.len(),
            sheet_name,
            path.as_ref().display()
        );
        RawTable::from_grid(grid, header)
    }

    /// Load a spreadsheet export, choosing the reader by file extension.
    ///
    /// `.csv` and `.tsv` files use the CSV reader; everything else is opened
    /// as a workbook.
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("csv") => Self::from_csv_path(path, &options.csv, &options.header),
            Some("tsv") => Self::from_csv_path(
                path,
                &options.csv.clone().with_delimiter(b'\t'),
                &options.header,
            ),
            _ => Self::from_workbook(path, options.sheet.as_deref(), &options.header),
        }
    }
}
