use crate::cell::CellValue;
use crate::error::Result;
use crate::raw::{HeaderOptions, RawTable};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether to use type inference for data cells
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

impl RawTable {
    /// Load a two-row-header table from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(
        path: P,
        options: &CsvOptions,
        header: &HeaderOptions,
    ) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(BufReader::new(file), options, header)
    }

    /// Load a two-row-header table from a CSV string
    pub fn from_csv_str(content: &str, options: &CsvOptions, header: &HeaderOptions) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), options, header)
    }

    /// Load a two-row-header table from a reader.
    ///
    /// Header cells are kept verbatim so that whitespace-only labels survive;
    /// data cells go through type inference unless disabled.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        options: &CsvOptions,
        header: &HeaderOptions,
    ) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // Both header rows are handled by RawTable
            .flexible(true)
            .from_reader(reader);

        let mut grid: Vec<Vec<CellValue>> = Vec::new();

        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            let is_header = index < 2;
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if options.infer_types && !is_header {
                        CellValue::parse(field)
                    } else {
                        CellValue::String(field.to_string())
                    }
                })
                .collect();
            grid.push(row);
        }

        tracing::debug!("Read {} CSV rows including headers", grid.len());
        RawTable::from_grid(grid, header)
    }
}
