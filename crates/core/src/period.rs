//! Quarter labels and the period filter.

use crate::header::FlatTable;
use chrono::NaiveDate;
use exportdash_sheet::CellValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical name of the date column after filtering.
pub const DATETIME_COLUMN: &str = "datetime";

fn quarter_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{4})Q([1-4])$").expect("valid regex"))
}

/// A calendar quarter such as `2020Q3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quarter {
    pub year: i32,
    /// 1 through 4.
    pub quarter: u8,
}

impl Quarter {
    /// First day of the quarter (Jan 1, Apr 1, Jul 1 or Oct 1).
    #[must_use]
    pub fn start_date(self) -> NaiveDate {
        let month = u32::from(self.quarter.clamp(1, 4)) * 3 - 2;
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The quarter containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            quarter: ((date.month0() / 3) + 1) as u8,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}Q{}", self.year, self.quarter)
    }
}

/// Outcome of parsing a period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodParse {
    Parsed(Quarter),
    Rejected,
}

impl PeriodParse {
    /// The parsed quarter, if any.
    #[must_use]
    pub fn quarter(self) -> Option<Quarter> {
        match self {
            PeriodParse::Parsed(q) => Some(q),
            PeriodParse::Rejected => None,
        }
    }
}

/// Parse a `YYYYQ[1-4]` label after trimming surrounding whitespace.
///
/// Anything else, including `2020`, `Q1 2020`, `2021Q5`, blanks and titles,
/// is `Rejected`.
#[must_use]
pub fn parse_quarter(label: &str) -> PeriodParse {
    let Some(caps) = quarter_regex().captures(label.trim()) else {
        return PeriodParse::Rejected;
    };

    match (caps[1].parse::<i32>(), caps[2].parse::<u8>()) {
        (Ok(year), Ok(quarter)) => PeriodParse::Parsed(Quarter { year, quarter }),
        _ => PeriodParse::Rejected,
    }
}

/// Parse a period cell using its string form.
#[must_use]
pub fn parse_period_cell(cell: &CellValue) -> PeriodParse {
    parse_quarter(&cell.as_str())
}

/// A table restricted to rows with a valid quarter label.
///
/// The date column is held separately; `columns` and each row in `rows`
/// cover the remaining value columns only.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTable {
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl PeriodTable {
    /// Quarter start dates, one per row.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Value column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value cells, one row per date.
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// All column names with the date column first.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(DATETIME_COLUMN.to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    /// Number of retained rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.dates.len()
    }
}

/// Keep only rows whose time label is a valid quarter and convert it to the
/// quarter's start date.
#[must_use]
pub fn filter_periods(table: FlatTable) -> PeriodTable {
    let FlatTable {
        columns,
        time_index,
        rows,
    } = table;

    let total = rows.len();
    let mut dates = Vec::with_capacity(total);
    let mut kept = Vec::with_capacity(total);

    for mut row in rows {
        let label = if time_index < row.len() {
            row.remove(time_index)
        } else {
            CellValue::Null
        };
        match parse_period_cell(&label) {
            PeriodParse::Parsed(q) => {
                dates.push(q.start_date());
                kept.push(row);
            }
            PeriodParse::Rejected => {
                tracing::debug!("Dropping row with period label {:?}", label.as_str());
            }
        }
    }

    let columns = columns
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != time_index)
        .map(|(_, name)| name.trim().to_string())
        .collect();

    tracing::info!("Period filter kept {} of {} rows", kept.len(), total);

    PeriodTable {
        dates,
        columns,
        rows: kept,
    }
}
