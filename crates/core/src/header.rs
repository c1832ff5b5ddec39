//! Header normalization: two-level labels to single column names.

use crate::config::PipelineOptions;
use crate::error::{PipelineError, PipelineResult};
use exportdash_sheet::{CellValue, HeaderPair, RawTable};

/// A table with single-level column names and a located time column.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    pub(crate) columns: Vec<String>,
    pub(crate) time_index: usize,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl FlatTable {
    /// Flattened column names, in sheet order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of the time column.
    #[must_use]
    pub fn time_index(&self) -> usize {
        self.time_index
    }

    /// Data rows, one cell per column.
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

/// Join one column's non-empty header parts with `_`.
///
/// Only truly empty parts are skipped; a whitespace-only outer label is
/// kept so `(" ", "datetime")` becomes `" _datetime"`.
#[must_use]
pub fn flatten_label(pair: &HeaderPair) -> String {
    [pair.outer.as_str(), pair.inner.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// Flatten an ordered sequence of header pairs into trimmed column names.
#[must_use]
pub fn flatten_headers(headers: &[HeaderPair]) -> Vec<String> {
    headers
        .iter()
        .map(|pair| flatten_label(pair).trim().to_string())
        .collect()
}

/// Flatten the header, drop the positional index column and locate the
/// time column.
///
/// The time column is matched on its trimmed name, so the configured
/// `" _datetime"` finds the flattened `"_datetime"`.
///
/// # Errors
///
/// Returns `MalformedHeader` if no column matches the time column.
pub fn normalize_headers(raw: RawTable, options: &PipelineOptions) -> PipelineResult<FlatTable> {
    let (headers, rows) = raw.into_parts();
    let names = flatten_headers(&headers);

    let index_name = options.index_column.trim();
    let keep: Vec<bool> = names
        .iter()
        .map(|name| index_name.is_empty() || name != index_name)
        .collect();

    let columns: Vec<String> = names
        .into_iter()
        .zip(&keep)
        .filter_map(|(name, keep)| keep.then_some(name))
        .collect();

    let expected = options.time_column.trim();
    let time_index = columns
        .iter()
        .position(|name| name == expected)
        .ok_or_else(|| PipelineError::malformed_header(options.time_column.clone(), &columns))?;

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(cell, keep)| keep.then_some(cell))
                .collect()
        })
        .collect();

    tracing::debug!(
        "Flattened {} columns, time column at position {}",
        columns.len(),
        time_index
    );

    Ok(FlatTable {
        columns,
        time_index,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: Vec<(&str, &str)>, rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(
            headers
                .into_iter()
                .map(|(o, i)| HeaderPair::new(o, i))
                .collect(),
            rows,
        )
    }

    #[test]
    fn test_flatten_label() {
        assert_eq!(flatten_label(&HeaderPair::new("USA", "Chemicals")), "USA_Chemicals");
        assert_eq!(flatten_label(&HeaderPair::new(" ", "datetime")), " _datetime");
        assert_eq!(flatten_label(&HeaderPair::new("", "datetime")), "datetime");
        assert_eq!(flatten_label(&HeaderPair::new("index", "")), "index");
        assert_eq!(flatten_label(&HeaderPair::new("", "")), "");
    }

    #[test]
    fn test_flatten_headers_trims() {
        let names = flatten_headers(&[
            HeaderPair::new(" ", "datetime"),
            HeaderPair::new("USA", "Machinery "),
        ]);
        assert_eq!(names, vec!["_datetime", "USA_Machinery"]);
    }

    #[test]
    fn test_normalize_drops_index_and_finds_time_column() {
        let table = raw(
            vec![("index", ""), (" ", "datetime"), ("USA", "Chemicals")],
            vec![vec![
                CellValue::Int(0),
                CellValue::from("2021Q1"),
                CellValue::Int(100),
            ]],
        );

        let flat = normalize_headers(table, &PipelineOptions::default()).unwrap();
        assert_eq!(flat.columns(), &["_datetime", "USA_Chemicals"]);
        assert_eq!(flat.time_index(), 0);
        assert_eq!(flat.rows()[0], vec![CellValue::from("2021Q1"), CellValue::Int(100)]);
    }

    #[test]
    fn test_time_column_need_not_be_first() {
        let table = raw(vec![("USA", "Chemicals"), (" ", "datetime")], vec![]);
        let flat = normalize_headers(table, &PipelineOptions::default()).unwrap();
        assert_eq!(flat.time_index(), 1);
    }

    #[test]
    fn test_missing_time_column_is_malformed() {
        let table = raw(vec![("", "period"), ("USA", "Chemicals")], vec![]);
        let err = normalize_headers(table, &PipelineOptions::default()).unwrap_err();

        match err {
            PipelineError::MalformedHeader { expected, found } => {
                assert_eq!(expected, " _datetime");
                assert_eq!(found, vec!["period", "USA_Chemicals"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_time_column() {
        let table = raw(vec![("", "period"), ("USA", "Chemicals")], vec![]);
        let options = PipelineOptions::default().with_time_column("period");
        assert!(normalize_headers(table, &options).is_ok());
    }
}
