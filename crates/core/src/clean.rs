//! Cleaning and product relabeling.

use crate::tidy::{TidyRecord, TidyTable};
use crate::unpivot::{LongRow, LongTable};
use exportdash_sheet::CellValue;

/// Source product labels and their English names.
///
/// `"Machinery "` keeps its trailing space; consumers match it exactly.
pub const PRODUCT_TRANSLATIONS: [(&str, &str); 10] = [
    ("化學品", "Chemicals"),
    ("塑膠、橡膠及其製品", "Plastics"),
    ("紡織品", "Textiles"),
    ("基本金屬及其製品", "Base metals/products"),
    ("電子產品", "Electronic products"),
    ("機械", "Machinery "),
    ("電機產品", "Electrical machinery / product"),
    ("資訊與通信產品", "ICT products"),
    ("運輸工具及其設備", "Transport equipment"),
    ("光學器材", "Optical instruments"),
];

/// Map a product label through [`PRODUCT_TRANSLATIONS`]; unknown labels pass
/// through unchanged.
#[must_use]
pub fn relabel_product(product: &str) -> &str {
    PRODUCT_TRANSLATIONS
        .iter()
        .find(|(source, _)| *source == product)
        .map(|(_, english)| *english)
        .unwrap_or(product)
}

/// Whether a string is empty or whitespace only.
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn non_blank(field: Option<String>) -> Option<String> {
    field.filter(|s| !is_blank(s))
}

/// Turn the long table into tidy records.
///
/// In order: blank strings become missing, values are coerced to numbers
/// (failures become missing), rows missing any of date, country, product or
/// value are dropped, and products are relabeled. Output order follows
/// input order.
#[must_use]
pub fn clean(table: LongTable) -> TidyTable {
    let total = table.len();
    let mut records = Vec::with_capacity(total);

    for row in table.rows {
        let LongRow {
            datetime,
            country,
            product,
            value,
        } = row;

        let country = non_blank(country);
        let product = non_blank(product);
        let value = coerce_value(&value);

        match (datetime, country, product, value) {
            (Some(date), Some(country), Some(product), Some(value)) => {
                let product = relabel_product(&product).to_string();
                records.push(TidyRecord {
                    date,
                    country,
                    product,
                    value,
                });
            }
            (date, country, product, value) => {
                tracing::debug!(
                    ?date,
                    ?country,
                    ?product,
                    ?value,
                    "Dropping incomplete record"
                );
            }
        }
    }

    let dropped = total - records.len();
    if records.is_empty() && total > 0 {
        tracing::warn!("Cleaning dropped every one of {} rows", total);
    } else {
        tracing::info!("Cleaner kept {} rows, dropped {}", records.len(), dropped);
    }

    TidyTable::new(records)
}

/// Coerce a cell to a number the way the cleaner does.
#[must_use]
pub fn coerce_value(cell: &CellValue) -> Option<f64> {
    if cell.is_blank() {
        None
    } else {
        cell.to_number()
    }
}
