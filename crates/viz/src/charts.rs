//! The fixed dashboard charts.
//!
//! Each function is a pure aggregation over the tidy table; none of them
//! fail, an empty table simply yields a chart without data.

use crate::aggregate::{date_label, pct_change, pivot, sorted_desc, sum_by};
use crate::{ChartKind, ChartSpec, Dataset, Encoding};
use exportdash_core::{DashboardConfig, TidyRecord, TidyTable};
use std::collections::BTreeMap;

/// Axis label for summed export values.
pub const VALUE_LABEL: &str = "Export Amount (million dollars)";

const SERIES_LABEL: &str = "Export Amount";
const SI_FORMAT: &str = ".2s";

/// Overall trend: total exports per quarter.
#[must_use]
pub fn overall_trend(table: &TidyTable) -> ChartSpec {
    let sums = sum_by(table, |r| r.date);

    let mut chart = ChartSpec::new(
        "overall-trend",
        ChartKind::Line,
        "Taiwan Export Amount Overall Trend",
    )
    .with_encoding(Encoding::new("date", "value"))
    .with_axis_labels("Date", VALUE_LABEL);
    chart.data.labels = sums.keys().copied().map(date_label).collect();
    chart
        .data
        .datasets
        .push(Dataset::new(SERIES_LABEL, sums.into_values().map(Some).collect()));
    chart.options.show_legend = false;
    chart
}

/// Exports per country, largest first.
#[must_use]
pub fn country_bar(table: &TidyTable) -> ChartSpec {
    let ranked = sorted_desc(sum_by(table, |r| r.country.clone()));

    let mut chart = ChartSpec::new(
        "country-bar",
        ChartKind::Bar,
        "Taiwan Export Amount by Country/Region",
    )
    .with_encoding(Encoding::new("country", "value"))
    .with_axis_labels("Country/Region", VALUE_LABEL);
    fill_ranked(&mut chart, ranked);
    chart.options.value_format = Some(SI_FORMAT.to_string());
    chart.options.show_legend = false;
    chart
}

/// One trend line per country.
#[must_use]
pub fn country_trend(table: &TidyTable) -> ChartSpec {
    let sums = sum_by(table, |r| (r.country.clone(), r.date));
    let (dates, series) = pivot(&sums);

    let mut chart = ChartSpec::new(
        "country-trend",
        ChartKind::Line,
        "Taiwan Export Amount by Country/Region",
    )
    .with_encoding(Encoding::new("date", "value").with_color("country"))
    .with_axis_labels("Date", VALUE_LABEL)
    .with_size(1000, 500);
    chart.data.labels = dates.into_iter().map(date_label).collect();
    chart.data.datasets = series
        .into_iter()
        .map(|(country, data)| Dataset::new(country, data))
        .collect();
    chart
}

/// Exports per product category, largest first.
#[must_use]
pub fn product_bar(table: &TidyTable) -> ChartSpec {
    let ranked = sorted_desc(sum_by(table, |r| r.product.clone()));

    let mut chart = ChartSpec::new(
        "product-bar",
        ChartKind::Bar,
        "Taiwan Export Amount by Product Category",
    )
    .with_encoding(Encoding::new("product", "value"))
    .with_axis_labels("Product Category", VALUE_LABEL)
    .with_size(600, 500);
    fill_ranked(&mut chart, ranked);
    chart.options.value_format = Some(SI_FORMAT.to_string());
    chart.options.show_legend = false;
    chart
}

/// Share of each product category in total exports.
#[must_use]
pub fn product_pie(table: &TidyTable) -> ChartSpec {
    let ranked = sorted_desc(sum_by(table, |r| r.product.clone()));

    let mut chart = ChartSpec::new(
        "product-pie",
        ChartKind::Pie,
        "Taiwan Export Amount by Product Category",
    )
    .with_encoding(Encoding::new("product", "value").with_color("product"))
    .with_size(600, 500);
    fill_ranked(&mut chart, ranked);
    chart
}

/// Spread of quarterly totals per product on a log scale.
///
/// Each box is built from the per-quarter sums of one product; `data`
/// carries the median so the JSON form stays readable without the samples.
#[must_use]
pub fn volatility_box(table: &TidyTable) -> ChartSpec {
    let sums = sum_by(table, |r| (r.product.clone(), r.date));

    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for ((product, _), value) in sums {
        samples.entry(product).or_default().push(value);
    }

    let mut chart = ChartSpec::new(
        "volatility-box",
        ChartKind::Box,
        "Sales Volatility by Product Category",
    )
    .with_encoding(Encoding::new("product", "value").with_log_y())
    .with_axis_labels("Product Category", VALUE_LABEL)
    .with_size(800, 600);

    let mut dataset = Dataset::new(SERIES_LABEL, Vec::with_capacity(samples.len()));
    for (product, values) in samples {
        chart.data.labels.push(product);
        dataset.data.push(median(&values));
        dataset.samples.push(values);
    }
    chart.data.datasets.push(dataset);
    chart.options.show_legend = false;
    chart
}

/// Quarterly pattern per year, one panel per country.
#[must_use]
pub fn seasonality(table: &TidyTable) -> ChartSpec {
    let sums = sum_by(table, |r| (r.country.clone(), r.year(), r.quarter()));

    let mut panels: BTreeMap<(String, i32), [Option<f64>; 4]> = BTreeMap::new();
    for ((country, year, quarter), value) in sums {
        let slots = panels.entry((country, year)).or_default();
        if let Some(slot) = usize::try_from(quarter)
            .ok()
            .and_then(|q| q.checked_sub(1))
            .and_then(|i| slots.get_mut(i))
        {
            *slot = Some(value);
        }
    }

    let mut chart = ChartSpec::new(
        "seasonality",
        ChartKind::Line,
        "Taiwan Export Seasonality by Country/Region",
    )
    .with_encoding(
        Encoding::new("quarter", "value")
            .with_color("year")
            .with_facet("country"),
    )
    .with_axis_labels("Quarter", VALUE_LABEL)
    .with_size(1000, 800);
    chart.data.labels = (1..=4).map(|q: u8| q.to_string()).collect();
    chart.data.datasets = panels
        .into_iter()
        .map(|((country, year), slots)| Dataset {
            facet: Some(country),
            ..Dataset::new(year.to_string(), slots.to_vec())
        })
        .collect();
    chart.options.facet_wrap = Some(3);
    chart.options.markers = true;
    chart
}

/// Country by product totals as a heatmap.
///
/// Labels are products (x), each dataset is one country (y row).
#[must_use]
pub fn product_heatmap(table: &TidyTable) -> ChartSpec {
    let sums = sum_by(table, |r| (r.country.clone(), r.product.clone()));
    let (products, rows) = pivot(&sums);

    let mut chart = ChartSpec::new(
        "product-heatmap",
        ChartKind::Heatmap,
        "Country-Product Export Amount Correlation Heatmap",
    )
    .with_encoding(Encoding::new("product", "country").with_color("value"))
    .with_axis_labels("Product", "Country/Region")
    .with_size(900, 700);
    chart.data.labels = products;
    chart.data.datasets = rows
        .into_iter()
        .map(|(country, data)| Dataset::new(country, data))
        .collect();
    chart
}

/// Settings for the year-over-year growth chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthOptions {
    /// Products compared, in legend order.
    pub products: Vec<String>,
    /// Years removed after growth has been computed.
    pub hidden_years: Vec<i32>,
    pub title: String,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for GrowthOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            products: config.growth_products.clone(),
            hidden_years: config.hidden_growth_years.clone(),
            title: "Year-over-Year Growth for ICT and Electronic Products".to_string(),
        }
    }
}

/// Year-over-year growth (%) of yearly totals for selected products.
///
/// Growth is computed against the previous year present for the product, so
/// the first year has no value. Hidden years are dropped only afterwards and
/// still serve as the base of the following year.
#[must_use]
pub fn growth_bars(table: &TidyTable, options: &GrowthOptions) -> ChartSpec {
    let selected = table
        .iter()
        .filter(|r| options.products.iter().any(|p| p == &r.product));
    let yearly = sum_by(selected, |r: &TidyRecord| (r.product.clone(), r.year()));

    let mut growth: BTreeMap<(String, i32), Option<f64>> = BTreeMap::new();
    for product in &options.products {
        let years: Vec<(i32, f64)> = yearly
            .iter()
            .filter(|((p, _), _)| p == product)
            .map(|((_, year), value)| (*year, *value))
            .collect();
        let values: Vec<f64> = years.iter().map(|(_, v)| *v).collect();
        for ((year, _), change) in years.iter().zip(pct_change(&values)) {
            if !options.hidden_years.contains(year) {
                growth.insert((product.clone(), *year), change);
            }
        }
    }

    let mut years: Vec<i32> = growth.keys().map(|(_, year)| *year).collect();
    years.sort_unstable();
    years.dedup();

    let mut chart = ChartSpec::new("yoy-growth", ChartKind::Bar, options.title.clone())
        .with_encoding(Encoding::new("year", "growth").with_color("product"))
        .with_axis_labels("Year", "Growth Rate(%)");
    chart.data.labels = years.iter().map(ToString::to_string).collect();
    for product in &options.products {
        if !growth.keys().any(|(p, _)| p == product) {
            continue;
        }
        let data = years
            .iter()
            .map(|year| growth.get(&(product.clone(), *year)).copied().flatten())
            .collect();
        chart.data.datasets.push(Dataset::new(product.clone(), data));
    }
    chart.options.grouped = true;
    chart.options.value_format = Some(".2f".to_string());
    chart
}

fn fill_ranked(chart: &mut ChartSpec, ranked: Vec<(String, f64)>) {
    let (labels, values): (Vec<String>, Vec<Option<f64>>) =
        ranked.into_iter().map(|(k, v)| (k, Some(v))).unzip();
    chart.data.labels = labels;
    chart.data.datasets.push(Dataset::new(SERIES_LABEL, values));
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(year: i32, month: u32, country: &str, product: &str, value: f64) -> TidyRecord {
        TidyRecord {
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            country: country.to_string(),
            product: product.to_string(),
            value,
        }
    }

    fn sample() -> TidyTable {
        vec![
            record(2021, 1, "USA", "Chemicals", 10.0),
            record(2021, 1, "Japan", "Chemicals", 5.0),
            record(2021, 4, "USA", "ICT products", 40.0),
            record(2022, 1, "Japan", "ICT products", 20.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_overall_trend_sums_by_date() {
        let chart = overall_trend(&sample());
        assert_eq!(chart.data.labels, vec!["2021-01-01", "2021-04-01", "2022-01-01"]);
        assert_eq!(chart.data.datasets[0].data, vec![Some(15.0), Some(40.0), Some(20.0)]);
    }

    #[test]
    fn test_country_bar_sorted_descending() {
        let chart = country_bar(&sample());
        assert_eq!(chart.data.labels, vec!["USA", "Japan"]);
        assert_eq!(chart.data.datasets[0].data, vec![Some(50.0), Some(25.0)]);
        assert_eq!(chart.options.value_format.as_deref(), Some(".2s"));
    }

    #[test]
    fn test_country_trend_has_gaps() {
        let chart = country_trend(&sample());
        let japan = &chart.data.datasets[0];
        assert_eq!(japan.label, "Japan");
        assert_eq!(japan.data, vec![Some(5.0), None, Some(20.0)]);
    }

    #[test]
    fn test_product_pie_matches_bar() {
        let table = sample();
        let bar = product_bar(&table);
        let pie = product_pie(&table);
        assert_eq!(bar.data, pie.data);
        assert_eq!(pie.data.labels, vec!["ICT products", "Chemicals"]);
    }

    #[test]
    fn test_volatility_box_uses_quarter_sums() {
        let chart = volatility_box(&sample());
        assert!(chart.encoding.log_y);
        assert_eq!(chart.data.labels, vec!["Chemicals", "ICT products"]);
        let dataset = &chart.data.datasets[0];
        assert_eq!(dataset.samples, vec![vec![15.0], vec![40.0, 20.0]]);
        assert_eq!(dataset.data, vec![Some(15.0), Some(30.0)]);
    }

    #[test]
    fn test_seasonality_panels() {
        let chart = seasonality(&sample());
        assert_eq!(chart.data.labels, vec!["1", "2", "3", "4"]);
        assert_eq!(chart.options.facet_wrap, Some(3));
        assert!(chart.options.markers);

        let usa_2021 = chart
            .data
            .datasets
            .iter()
            .find(|d| d.facet.as_deref() == Some("USA") && d.label == "2021")
            .unwrap();
        assert_eq!(usa_2021.data, vec![Some(10.0), Some(40.0), None, None]);
        assert_eq!(chart.data.datasets.len(), 3);
    }

    #[test]
    fn test_heatmap_rows_per_country() {
        let chart = product_heatmap(&sample());
        assert_eq!(chart.data.labels, vec!["Chemicals", "ICT products"]);
        assert_eq!(chart.data.datasets[1].label, "USA");
        assert_eq!(chart.data.datasets[1].data, vec![Some(10.0), Some(40.0)]);
    }

    #[test]
    fn test_growth_hides_years_after_computing() {
        let table: TidyTable = vec![
            record(2017, 1, "USA", "ICT products", 100.0),
            record(2018, 1, "USA", "ICT products", 150.0),
            record(2019, 1, "USA", "ICT products", 120.0),
            record(2018, 1, "USA", "Electronic products", 50.0),
            record(2019, 1, "USA", "Electronic products", 100.0),
            record(2019, 1, "USA", "Chemicals", 1.0),
        ]
        .into_iter()
        .collect();

        let chart = growth_bars(&table, &GrowthOptions::default());
        assert_eq!(chart.data.labels, vec!["2018", "2019"]);
        assert_eq!(chart.data.datasets.len(), 2);

        let ict = &chart.data.datasets[0];
        assert_eq!(ict.label, "ICT products");
        assert_eq!(ict.data[0], Some(50.0));
        assert!((ict.data[1].unwrap() + 20.0).abs() < 1e-9);

        let electronic = &chart.data.datasets[1];
        assert_eq!(electronic.data, vec![None, Some(100.0)]);
        assert!(chart.options.grouped);
    }

    #[test]
    fn test_growth_series_follow_configured_order() {
        let table: TidyTable = vec![
            record(2018, 1, "USA", "ICT products", 1.0),
            record(2019, 1, "USA", "ICT products", 2.0),
            record(2018, 1, "USA", "Electronic products", 1.0),
            record(2019, 1, "USA", "Electronic products", 3.0),
        ]
        .into_iter()
        .collect();

        let labels = |options: &GrowthOptions| -> Vec<String> {
            growth_bars(&table, options)
                .data
                .datasets
                .into_iter()
                .map(|d| d.label)
                .collect()
        };
        assert_eq!(
            labels(&GrowthOptions::default()),
            vec!["ICT products", "Electronic products"]
        );

        let reversed = GrowthOptions {
            products: vec!["Electronic products".to_string(), "ICT products".to_string()],
            ..GrowthOptions::default()
        };
        assert_eq!(labels(&reversed), vec!["Electronic products", "ICT products"]);
    }

    #[test]
    fn test_empty_table_yields_empty_charts() {
        let table = TidyTable::default();
        assert!(overall_trend(&table).data.labels.is_empty());
        assert!(growth_bars(&table, &GrowthOptions::default()).data.datasets.is_empty());
        assert!(volatility_box(&table).data.labels.is_empty());
    }
}
