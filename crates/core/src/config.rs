//! Configuration for a dashboard run.
//!
//! Settings come from an optional TOML file; every field has a default that
//! reproduces the stock Taiwan export dashboard.
//!
//! ```toml
//! [input]
//! path = "data/TWsalesamount.xls"
//! time_column = " _datetime"
//!
//! [dashboard]
//! output_dir = "dashboard"
//! hidden_growth_years = [2017, 2025]
//! ```

use crate::error::{PipelineError, PipelineResult};
use exportdash_sheet::{HeaderOptions, LoadOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the spreadsheet export.
pub const DEFAULT_INPUT_PATH: &str = "data/TWsalesamount.xls";
/// Flattened name of the period column in the stock export.
pub const DEFAULT_TIME_COLUMN: &str = " _datetime";
/// Name of the positional index column some exports carry.
pub const DEFAULT_INDEX_COLUMN: &str = "index";

/// Options for the transformation stages.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Flattened name of the period column, compared after trimming.
    pub time_column: String,
    /// Flattened name of a positional index column to drop when present.
    pub index_column: String,
    /// How the spreadsheet itself is read.
    pub load: LoadOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            load: LoadOptions::default(),
        }
    }
}

impl PipelineOptions {
    /// Set the time column name
    #[must_use]
    pub fn with_time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = name.into();
        self
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub dashboard: DashboardConfig,
}

/// `[input]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub time_column: String,
    pub index_column: String,
    pub forward_fill_outer: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INPUT_PATH),
            sheet: None,
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            index_column: DEFAULT_INDEX_COLUMN.to_string(),
            forward_fill_outer: true,
        }
    }
}

impl InputConfig {
    /// Build pipeline options from this section.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        let mut load = LoadOptions::default()
            .with_header(HeaderOptions::default().with_forward_fill(self.forward_fill_outer));
        load.sheet.clone_from(&self.sheet);

        PipelineOptions {
            time_column: self.time_column.clone(),
            index_column: self.index_column.clone(),
            load,
        }
    }
}

/// `[dashboard]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory the rendered page and chart JSON are written to.
    pub output_dir: PathBuf,
    /// Products compared in the year-over-year growth chart.
    pub growth_products: Vec<String>,
    /// Years hidden from the growth chart after growth is computed.
    pub hidden_growth_years: Vec<i32>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dashboard"),
            growth_products: vec!["ICT products".to_string(), "Electronic products".to_string()],
            hidden_growth_years: vec![2017, 2025],
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let config: Config = toml::from_str(content)?;
        if config.input.time_column.trim().is_empty() {
            return Err(PipelineError::Config(
                "input.time_column must not be blank".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }
}
