//! Single-page dashboard assembly and HTML rendering.

use crate::charts::{
    country_bar, country_trend, growth_bars, overall_trend, product_bar, product_heatmap,
    product_pie, seasonality, volatility_box, GrowthOptions,
};
use crate::error::{VizError, VizResult};
use crate::selection::{comparison_chart, unknown_choices, Selection};
use crate::{escape_html, script_json, ChartSpec};
use exportdash_core::{DashboardConfig, TidyTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Page heading.
pub const DASHBOARD_TITLE: &str = "Taiwan Export Amount Analysis Dashboard";

const EMPTY_SELECTION_WARNING: &str = "Select at least one product to compare.";

/// All charts of one dashboard render, in page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub charts: Vec<ChartSpec>,
    /// User-visible notices shown above the charts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Dashboard {
    /// Build the fixed chart sequence followed by the comparison chart for
    /// the current selection.
    ///
    /// An empty product selection is reported as a warning and the
    /// comparison chart is left out. A country or product the table does not
    /// contain is also reported.
    #[must_use]
    pub fn build(table: &TidyTable, config: &DashboardConfig, selection: &Selection) -> Self {
        let mut charts = vec![
            overall_trend(table),
            country_bar(table),
            country_trend(table),
            product_bar(table),
            product_pie(table),
            volatility_box(table),
            seasonality(table),
            product_heatmap(table),
            growth_bars(table, &GrowthOptions::from(config)),
        ];

        let mut warnings = unknown_choices(table, selection);
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        match comparison_chart(table, selection) {
            Ok(chart) => charts.push(chart),
            Err(VizError::EmptySelection) => {
                tracing::warn!("No products selected, skipping comparison chart");
                warnings.push(EMPTY_SELECTION_WARNING.to_string());
            }
            Err(e) => warnings.push(e.to_string()),
        }

        if table.is_empty() {
            warnings.push("The input produced no export records.".to_string());
        }

        tracing::info!("Built dashboard with {} charts", charts.len());
        Self {
            title: DASHBOARD_TITLE.to_string(),
            charts,
            warnings,
        }
    }

    /// Render every chart on one HTML page.
    pub fn to_html(&self) -> VizResult<String> {
        render_page(&self.title, &self.charts, &self.warnings)
    }

    /// Serialize the dashboard for a frontend.
    pub fn to_json(&self) -> VizResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `index.html` and `dashboard.json` into `dir`, creating it if
    /// needed. Returns the path of the HTML page.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> VizResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let html_path = dir.join("index.html");
        fs::write(&html_path, self.to_html()?)?;
        fs::write(dir.join("dashboard.json"), self.to_json()?)?;

        tracing::info!("Wrote dashboard to {}", html_path.display());
        Ok(html_path)
    }
}

/// Render charts as a standalone page with embedded Chart.js.
pub(crate) fn render_page(
    title: &str,
    charts: &[ChartSpec],
    warnings: &[String],
) -> VizResult<String> {
    let title = escape_html(title);
    let specs = script_json(&charts)?;
    let notices: String = warnings
        .iter()
        .map(|w| format!("    <p class=\"warning\">{}</p>\n", escape_html(w)))
        .collect();

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/@sgratzl/chartjs-chart-boxplot"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-chart-matrix"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2"></script>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; }}
        .warning {{ color: #8a6d3b; background: #fcf8e3; padding: 0.5rem 1rem; }}
        .chart {{ margin-bottom: 3rem; }}
        .facets {{ display: grid; gap: 1rem; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
{notices}    <div id="charts"></div>
    <script>
        const specs = {specs};
        const root = document.getElementById('charts');
        const chartType = {{ bar: 'bar', line: 'line', pie: 'pie', box: 'boxplot', heatmap: 'matrix' }};

        function formatValue(v, fmt) {{
            if (v === null || v === undefined) return '';
            if (fmt === '.2f') return v.toFixed(2);
            if (fmt === '.2s') return Intl.NumberFormat('en', {{ notation: 'compact', maximumSignificantDigits: 2 }}).format(v);
            return String(v);
        }}

        function datasetsFor(spec, datasets) {{
            if (spec.chart_type === 'box') {{
                return datasets.map(d => ({{ label: d.label, data: d.samples }}));
            }}
            if (spec.chart_type === 'heatmap') {{
                const cells = [];
                datasets.forEach(d => d.data.forEach((v, i) => {{
                    if (v !== null) cells.push({{ x: spec.data.labels[i], y: d.label, v: v }});
                }}));
                const max = Math.max(1, ...cells.map(c => c.v));
                return [{{
                    label: spec.title,
                    data: cells,
                    backgroundColor: c => `rgba(178, 24, 43, ${{(c.raw ? c.raw.v : 0) / max}})`,
                }}];
            }}
            return datasets.map(d => ({{ label: d.label, data: d.data, pointRadius: spec.options.markers ? 3 : 0 }}));
        }}

        function scalesFor(spec) {{
            if (spec.chart_type === 'pie') return {{}};
            const x = {{ title: {{ display: !!spec.options.x_axis_label, text: spec.options.x_axis_label }} }};
            const y = {{ title: {{ display: !!spec.options.y_axis_label, text: spec.options.y_axis_label }} }};
            if (spec.chart_type === 'heatmap') {{
                x.type = 'category'; x.labels = spec.data.labels;
                y.type = 'category'; y.labels = spec.data.datasets.map(d => d.label);
            }}
            if (spec.encoding.log_y) y.type = 'logarithmic';
            if (spec.chart_type === 'bar' && !spec.options.grouped) x.stacked = false;
            return {{ x, y }};
        }}

        function draw(container, spec, title, datasets) {{
            const canvas = document.createElement('canvas');
            canvas.width = spec.options.width;
            canvas.height = spec.options.height;
            container.appendChild(canvas);
            new Chart(canvas.getContext('2d'), {{
                type: chartType[spec.chart_type],
                data: {{ labels: spec.data.labels, datasets: datasetsFor(spec, datasets) }},
                plugins: [ChartDataLabels],
                options: {{
                    responsive: true,
                    scales: scalesFor(spec),
                    plugins: {{
                        title: {{ display: true, text: title }},
                        legend: {{ display: spec.options.show_legend }},
                        datalabels: {{
                            display: !!spec.options.value_format,
                            anchor: 'end',
                            align: 'end',
                            formatter: v => formatValue(v, spec.options.value_format)
                        }},
                        tooltip: {{
                            callbacks: {{
                                label: ctx => `${{ctx.dataset.label}}: ${{formatValue(ctx.parsed.y ?? ctx.parsed, spec.options.value_format)}}`
                            }}
                        }}
                    }}
                }}
            }});
        }}

        for (const spec of specs) {{
            const section = document.createElement('div');
            section.className = 'chart';
            section.id = spec.id;
            root.appendChild(section);

            const facets = [...new Set(spec.data.datasets.map(d => d.facet).filter(f => f))];
            if (facets.length === 0) {{
                draw(section, spec, spec.title, spec.data.datasets);
                continue;
            }}
            const heading = document.createElement('h2');
            heading.textContent = spec.title;
            section.appendChild(heading);
            const grid = document.createElement('div');
            grid.className = 'facets';
            grid.style.gridTemplateColumns = `repeat(${{spec.options.facet_wrap || 1}}, 1fr)`;
            section.appendChild(grid);
            for (const facet of facets) {{
                const cell = document.createElement('div');
                grid.appendChild(cell);
                draw(cell, spec, facet, spec.data.datasets.filter(d => d.facet === facet));
            }}
        }}
    </script>
</body>
</html>"#
    ))
}
