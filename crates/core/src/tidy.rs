//! The tidy output table.

use crate::error::PipelineResult;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;

/// One cleaned observation: a quarter's export value for a country and
/// product.
///
/// `(date, country, product)` is not unique; consumers sum over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    /// First day of the quarter.
    pub date: NaiveDate,
    pub country: String,
    pub product: String,
    pub value: f64,
}

impl TidyRecord {
    /// Calendar year of the record's quarter.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Quarter number, 1 through 4.
    #[must_use]
    pub fn quarter(&self) -> u32 {
        self.date.month0() / 3 + 1
    }
}

/// Immutable set of tidy records produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TidyTable {
    records: Vec<TidyRecord>,
}

impl TidyTable {
    #[must_use]
    pub fn new(records: Vec<TidyRecord>) -> Self {
        Self { records }
    }

    /// Records in pipeline order.
    #[must_use]
    pub fn records(&self) -> &[TidyRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &TidyRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct countries, sorted.
    #[must_use]
    pub fn countries(&self) -> Vec<String> {
        self.distinct(|r| r.country.clone())
    }

    /// Distinct products, sorted.
    #[must_use]
    pub fn products(&self) -> Vec<String> {
        self.distinct(|r| r.product.clone())
    }

    /// Distinct years, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.distinct(TidyRecord::year)
    }

    /// Earliest and latest quarter start dates.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Sum of all values.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.value).sum()
    }

    fn distinct<T: Ord, F: Fn(&TidyRecord) -> T>(&self, key: F) -> Vec<T> {
        self.records
            .iter()
            .map(key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Write the table as CSV with a `date,country,product,value` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> PipelineResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the table to a CSV string.
    pub fn to_csv_string(&self) -> PipelineResult<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }

    /// Convert the table to a JSON array of records.
    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRecord;
    type IntoIter = std::slice::Iter<'a, TidyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<TidyRecord> for TidyTable {
    fn from_iter<I: IntoIterator<Item = TidyRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
