//! # exportdash-viz
//!
//! Chart generation for the export dashboard.
//!
//! Every chart is a sum aggregation over the tidy table, described as a
//! [`ChartSpec`] that can be rendered by:
//! - HTML/Chart.js output ([`ChartSpec::to_html`], [`Dashboard::to_html`])
//! - any frontend consuming the JSON form ([`ChartSpec::to_json`])

pub mod aggregate;
pub mod charts;
pub mod dashboard;
pub mod error;
pub mod selection;

pub use charts::{
    country_bar, country_trend, growth_bars, overall_trend, product_bar, product_pie,
    product_heatmap, seasonality, volatility_box, GrowthOptions,
};
pub use dashboard::Dashboard;
pub use error::{VizError, VizResult};
pub use selection::{
    comparison_chart, unknown_choices, CountrySelection, ProductChoice, Selection,
};

use serde::{Deserialize, Serialize};

/// Chart specification for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable identifier, used as the element id when rendered.
    pub id: String,
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub encoding: Encoding,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Box,
    Heatmap,
}

impl ChartKind {
    /// Chart.js chart type (box and heatmap need the boxplot and matrix plugins).
    #[must_use]
    pub fn chartjs_type(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Box => "boxplot",
            ChartKind::Heatmap => "matrix",
        }
    }
}

/// Which fields of the tidy table feed each visual channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Encoding {
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    pub log_y: bool,
}

impl Encoding {
    #[must_use]
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, field: impl Into<String>) -> Self {
        self.color = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_facet(mut self, field: impl Into<String>) -> Self {
        self.facet = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_log_y(mut self) -> Self {
        self.log_y = true;
        self
    }
}

/// Chart data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
///
/// `data` is aligned with the chart labels; `None` marks a label with no
/// observations for this series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    /// Raw observations per label, for box plots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Vec<f64>>,
    /// Facet panel this series belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
}

impl Dataset {
    #[must_use]
    pub fn new(label: impl Into<String>, data: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            data,
            ..Self::default()
        }
    }
}

/// Chart rendering options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
    /// Grouped rather than overlaid bars.
    pub grouped: bool,
    /// Draw point markers on lines.
    pub markers: bool,
    /// d3-style format for the value labels drawn on bars and in tooltips (e.g. `.2s`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_format: Option<String>,
    /// Facet panels per row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_wrap: Option<usize>,
    pub width: u32,
    pub height: u32,
}

/// Escape HTML special characters to prevent XSS.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize a value for embedding inside a `<script>` element.
pub(crate) fn script_json<T: Serialize>(value: &T) -> VizResult<String> {
    // Prevent script tag breakout and markup injection through labels
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(id: impl Into<String>, chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chart_type,
            title: title.into(),
            data: ChartData::default(),
            encoding: Encoding::default(),
            options: ChartOptions {
                show_legend: true,
                width: 800,
                height: 500,
                ..ChartOptions::default()
            },
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.options.x_axis_label = Some(x.into());
        self.options.y_axis_label = Some(y.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.options.width = width;
        self.options.height = height;
        self
    }

    /// Convert to JSON string for IPC/frontend rendering.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> VizResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Generate a standalone HTML page with embedded Chart.js.
    pub fn to_html(&self) -> VizResult<String> {
        dashboard::render_page(&self.title, std::slice::from_ref(self), &[])
    }
}
