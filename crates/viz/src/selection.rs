//! User-driven filtering for the comparison chart.

use crate::aggregate::{date_label, sum_by};
use crate::charts::VALUE_LABEL;
use crate::error::{VizError, VizResult};
use crate::{ChartKind, ChartSpec, Dataset, Encoding};
use exportdash_core::{TidyRecord, TidyTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Label of the all-countries / all-products choice.
pub const TOTAL: &str = "Total";

/// Single-select country filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CountrySelection {
    /// Every country.
    #[default]
    Total,
    Country(String),
}

impl CountrySelection {
    #[must_use]
    pub fn matches(&self, country: &str) -> bool {
        match self {
            CountrySelection::Total => true,
            CountrySelection::Country(selected) => selected == country,
        }
    }
}

impl fmt::Display for CountrySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountrySelection::Total => write!(f, "{TOTAL}"),
            CountrySelection::Country(country) => write!(f, "{country}"),
        }
    }
}

impl FromStr for CountrySelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == TOTAL {
            Ok(CountrySelection::Total)
        } else {
            Ok(CountrySelection::Country(s.to_string()))
        }
    }
}

/// One entry of the multi-select product filter.
///
/// `Total` sorts before every product so it is drawn first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductChoice {
    /// Sum over all products.
    Total,
    Product(String),
}

impl fmt::Display for ProductChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductChoice::Total => write!(f, "{TOTAL}"),
            ProductChoice::Product(product) => write!(f, "{product}"),
        }
    }
}

impl FromStr for ProductChoice {
    type Err = Infallible;

    /// Product names are matched verbatim, since some carry trailing spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == TOTAL {
            Ok(ProductChoice::Total)
        } else {
            Ok(ProductChoice::Product(s.to_string()))
        }
    }
}

/// Current selection inputs supplied by the UI host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub country: CountrySelection,
    pub products: BTreeSet<ProductChoice>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            country: CountrySelection::Total,
            products: BTreeSet::from([ProductChoice::Total]),
        }
    }
}

impl Selection {
    #[must_use]
    pub fn with_country(mut self, country: CountrySelection) -> Self {
        self.country = country;
        self
    }

    /// Replace the product set. An empty iterator yields an empty selection.
    #[must_use]
    pub fn with_products(mut self, products: impl IntoIterator<Item = ProductChoice>) -> Self {
        self.products = products.into_iter().collect();
        self
    }
}

/// Country choices offered to the user, `Total` first.
#[must_use]
pub fn country_options(table: &TidyTable) -> Vec<String> {
    std::iter::once(TOTAL.to_string())
        .chain(table.countries())
        .collect()
}

/// Product choices offered to the user, `Total` first.
#[must_use]
pub fn product_options(table: &TidyTable) -> Vec<String> {
    std::iter::once(TOTAL.to_string())
        .chain(table.products())
        .collect()
}

/// Notices for a selected country or product that the table does not offer.
///
/// Products are matched verbatim, so a name that only differs by surrounding
/// whitespace gets a hint naming the exact option.
#[must_use]
pub fn unknown_choices(table: &TidyTable, selection: &Selection) -> Vec<String> {
    let mut warnings = Vec::new();

    if let CountrySelection::Country(country) = &selection.country {
        let countries = country_options(table);
        if !countries.contains(country) {
            warnings.push(format!(
                "Unknown country '{country}'. Choose one of: {}",
                countries.join(", ")
            ));
        }
    }

    let products = product_options(table);
    for choice in &selection.products {
        let ProductChoice::Product(product) = choice else {
            continue;
        };
        if products.contains(product) {
            continue;
        }
        match products.iter().find(|p| p.trim() == product.trim()) {
            Some(close) => warnings.push(format!(
                "Unknown product '{product}'. Did you mean '{close}'?"
            )),
            None => warnings.push(format!("Unknown product '{product}'")),
        }
    }

    warnings
}

/// Trend of the selected products within the selected country.
///
/// # Errors
///
/// Returns [`VizError::EmptySelection`] when no product is selected.
pub fn comparison_chart(table: &TidyTable, selection: &Selection) -> VizResult<ChartSpec> {
    if selection.products.is_empty() {
        return Err(VizError::EmptySelection);
    }

    let in_country: Vec<&TidyRecord> = table
        .iter()
        .filter(|r| selection.country.matches(&r.country))
        .collect();
    let dates: BTreeSet<_> = in_country.iter().map(|r| r.date).collect();

    let mut chart = ChartSpec::new(
        "comparison",
        ChartKind::Line,
        format!("Export Amount Comparison: {}", selection.country),
    )
    .with_encoding(Encoding::new("date", "value").with_color("product"))
    .with_axis_labels("Date", VALUE_LABEL)
    .with_size(1000, 500);
    chart.data.labels = dates.iter().copied().map(date_label).collect();

    for choice in &selection.products {
        let sums: BTreeMap<_, f64> = match choice {
            ProductChoice::Total => sum_by(in_country.iter().copied(), |r| r.date),
            ProductChoice::Product(product) => sum_by(
                in_country.iter().copied().filter(|r| &r.product == product),
                |r| r.date,
            ),
        };
        let data = dates.iter().map(|d| sums.get(d).copied()).collect();
        chart.data.datasets.push(Dataset::new(choice.to_string(), data));
    }

    tracing::debug!(
        "Comparison chart for {} with {} series",
        selection.country,
        chart.data.datasets.len()
    );
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(month: u32, country: &str, product: &str, value: f64) -> TidyRecord {
        TidyRecord {
            date: NaiveDate::from_ymd_opt(2021, month, 1).unwrap(),
            country: country.to_string(),
            product: product.to_string(),
            value,
        }
    }

    fn sample() -> TidyTable {
        vec![
            record(1, "USA", "Chemicals", 1.0),
            record(1, "USA", "Machinery ", 2.0),
            record(4, "USA", "Chemicals", 3.0),
            record(4, "Japan", "Chemicals", 10.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_default_selection_is_permissive() {
        let selection = Selection::default();
        assert_eq!(selection.country, CountrySelection::Total);
        assert!(selection.products.contains(&ProductChoice::Total));
    }

    #[test]
    fn test_parse_choices() {
        assert_eq!("Total".parse::<CountrySelection>(), Ok(CountrySelection::Total));
        assert_eq!(
            "USA".parse::<CountrySelection>(),
            Ok(CountrySelection::Country("USA".to_string()))
        );
        assert_eq!(
            "Machinery ".parse::<ProductChoice>(),
            Ok(ProductChoice::Product("Machinery ".to_string()))
        );
        assert!(ProductChoice::Total < ProductChoice::Product("A".to_string()));
    }

    #[test]
    fn test_options_lead_with_total() {
        let table = sample();
        assert_eq!(country_options(&table), vec!["Total", "Japan", "USA"]);
        assert_eq!(product_options(&table)[0], "Total");
    }

    #[test]
    fn test_total_comparison_sums_all_products() {
        let chart = comparison_chart(&sample(), &Selection::default()).unwrap();
        assert_eq!(chart.data.labels, vec!["2021-01-01", "2021-04-01"]);
        assert_eq!(chart.data.datasets[0].label, "Total");
        assert_eq!(chart.data.datasets[0].data, vec![Some(3.0), Some(13.0)]);
    }

    #[test]
    fn test_country_and_product_filter() {
        let selection = Selection::default()
            .with_country(CountrySelection::Country("USA".to_string()))
            .with_products([
                ProductChoice::Total,
                ProductChoice::Product("Machinery ".to_string()),
            ]);
        let chart = comparison_chart(&sample(), &selection).unwrap();

        assert_eq!(chart.data.datasets.len(), 2);
        assert_eq!(chart.data.datasets[0].data, vec![Some(3.0), Some(3.0)]);
        assert_eq!(chart.data.datasets[1].label, "Machinery ");
        assert_eq!(chart.data.datasets[1].data, vec![Some(2.0), None]);
    }

    #[test]
    fn test_unknown_choices() {
        let table = sample();
        assert!(unknown_choices(&table, &Selection::default()).is_empty());

        let selection = Selection::default()
            .with_country(CountrySelection::Country("usa".to_string()))
            .with_products([
                ProductChoice::Total,
                ProductChoice::Product("Machinery".to_string()),
                ProductChoice::Product("Toys".to_string()),
            ]);
        assert_eq!(
            unknown_choices(&table, &selection),
            vec![
                "Unknown country 'usa'. Choose one of: Total, Japan, USA".to_string(),
                "Unknown product 'Machinery'. Did you mean 'Machinery '?".to_string(),
                "Unknown product 'Toys'".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let selection = Selection::default().with_products(Vec::new());
        assert!(matches!(
            comparison_chart(&sample(), &selection),
            Err(VizError::EmptySelection)
        ));
    }
}
