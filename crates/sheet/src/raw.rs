use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};

/// One column's two-level header label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderPair {
    pub outer: String,
    pub inner: String,
}

impl HeaderPair {
    #[must_use]
    pub fn new(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            outer: outer.into(),
            inner: inner.into(),
        }
    }
}

/// Options controlling how the two header rows are read
#[derive(Debug, Clone)]
pub struct HeaderOptions {
    /// Fill empty outer labels from the nearest labelled column to the left.
    ///
    /// Merged outer cells (a country spanning its product columns) only
    /// carry a value in their first cell. Whitespace-only labels are kept
    /// as they are and never used as a fill source.
    pub forward_fill_outer: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        HeaderOptions {
            forward_fill_outer: true,
        }
    }
}

impl HeaderOptions {
    /// Set whether empty outer labels are forward-filled
    #[must_use]
    pub fn with_forward_fill(mut self, forward_fill_outer: bool) -> Self {
        self.forward_fill_outer = forward_fill_outer;
        self
    }
}

/// A spreadsheet export as loaded: a two-level header plus data rows.
///
/// Every data row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<HeaderPair>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table from header pairs and data rows, padding or truncating
    /// rows to the header width.
    #[must_use]
    pub fn new(headers: Vec<HeaderPair>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Build a table from a cell grid whose first two rows are the header.
    ///
    /// # Errors
    ///
    /// Returns `MissingHeader` if the grid has fewer than two rows.
    pub fn from_grid(grid: Vec<Vec<CellValue>>, options: &HeaderOptions) -> Result<Self> {
        if grid.len() < 2 {
            return Err(SheetError::MissingHeader { rows: grid.len() });
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let mut iter = grid.into_iter();
        let outer_row = iter.next().unwrap_or_default();
        let inner_row = iter.next().unwrap_or_default();

        let mut headers = Vec::with_capacity(width);
        let mut last_outer: Option<String> = None;

        for col in 0..width {
            let outer_cell = outer_row.get(col).unwrap_or(&CellValue::Null);
            let mut outer = outer_cell.as_str();
            if outer.is_empty() {
                if options.forward_fill_outer {
                    if let Some(fill) = &last_outer {
                        outer.clone_from(fill);
                    }
                }
            } else if outer.trim().is_empty() {
                // Explicit whitespace separates merged groups without labelling one
                last_outer = None;
            } else {
                last_outer = Some(outer.clone());
            }

            let inner = inner_row
                .get(col)
                .map(CellValue::as_str)
                .unwrap_or_default();
            headers.push(HeaderPair { outer, inner });
        }

        Ok(Self::new(headers, iter.collect()))
    }

    /// Column header pairs, in sheet order
    #[must_use]
    pub fn headers(&self) -> &[HeaderPair] {
        &self.headers
    }

    /// Data rows, excluding the two header rows
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Decompose into header pairs and data rows
    #[must_use]
    pub fn into_parts(self) -> (Vec<HeaderPair>, Vec<Vec<CellValue>>) {
        (self.headers, self.rows)
    }
}
