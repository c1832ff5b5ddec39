//! Wide-to-long reshaping.

use crate::period::PeriodTable;
use crate::tidy::{TidyRecord, TidyTable};
use chrono::NaiveDate;
use exportdash_sheet::CellValue;

/// One (date, country, product, value) observation before cleaning.
///
/// Any field may still be missing; the cleaner decides which rows survive.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub datetime: Option<NaiveDate>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub value: CellValue,
}

/// The unpivoted table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongTable {
    pub rows: Vec<LongRow>,
}

impl LongTable {
    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&TidyRecord> for LongRow {
    fn from(record: &TidyRecord) -> Self {
        LongRow {
            datetime: Some(record.date),
            country: Some(record.country.clone()),
            product: Some(record.product.clone()),
            value: CellValue::Float(record.value),
        }
    }
}

impl From<&TidyTable> for LongTable {
    fn from(table: &TidyTable) -> Self {
        LongTable {
            rows: table.iter().map(LongRow::from).collect(),
        }
    }
}

/// Split a `<country>_<product>` key on its first underscore only.
///
/// `"USA_Electronic_products"` gives `("USA", Some("Electronic_products"))`;
/// a key without an underscore has no product.
#[must_use]
pub fn split_composite_key(key: &str) -> (String, Option<String>) {
    match key.split_once('_') {
        Some((country, product)) => (country.to_string(), Some(product.to_string())),
        None => (key.to_string(), None),
    }
}

/// Melt every value column into one row per (date, column) pair and split
/// the column name into country and product.
///
/// Rows are emitted column by column, dates in table order within each
/// column.
#[must_use]
pub fn unpivot(table: PeriodTable) -> LongTable {
    let PeriodTable {
        dates,
        columns,
        rows,
    } = table;

    let mut out = Vec::with_capacity(dates.len() * columns.len());

    for (col, name) in columns.iter().enumerate() {
        let (country, product) = split_composite_key(name);
        for (date, row) in dates.iter().zip(&rows) {
            out.push(LongRow {
                datetime: Some(*date),
                country: Some(country.clone()),
                product: product.clone(),
                value: row.get(col).cloned().unwrap_or_default(),
            });
        }
    }

    tracing::info!(
        "Unpivoted {} dates x {} columns into {} rows",
        dates.len(),
        columns.len(),
        out.len()
    );

    LongTable { rows: out }
}
