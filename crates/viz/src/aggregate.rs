//! Group-and-sum helpers shared by the charts.
//!
//! Groups come back in key order, like a sorted group-by.

use chrono::NaiveDate;
use exportdash_core::TidyRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Sum `value` per key.
pub fn sum_by<'a, K, I, F>(records: I, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = &'a TidyRecord>,
    F: Fn(&TidyRecord) -> K,
{
    let mut sums = BTreeMap::new();
    for record in records {
        *sums.entry(key(record)).or_insert(0.0) += record.value;
    }
    sums
}

/// Order groups by descending total; ties keep key order.
#[must_use]
pub fn sorted_desc<K: Ord>(sums: BTreeMap<K, f64>) -> Vec<(K, f64)> {
    let mut pairs: Vec<(K, f64)> = sums.into_iter().collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs
}

/// Reshape `(series, x) -> value` sums into shared x labels and one aligned
/// row per series. Missing combinations are `None`.
#[must_use]
pub fn pivot<S, X>(sums: &BTreeMap<(S, X), f64>) -> (Vec<X>, Vec<(S, Vec<Option<f64>>)>)
where
    S: Ord + Clone,
    X: Ord + Clone,
{
    let xs: Vec<X> = sums
        .keys()
        .map(|(_, x)| x.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let series: BTreeSet<S> = sums.keys().map(|(s, _)| s.clone()).collect();

    let rows = series
        .into_iter()
        .map(|s| {
            let row = xs
                .iter()
                .map(|x| sums.get(&(s.clone(), x.clone())).copied())
                .collect();
            (s, row)
        })
        .collect();

    (xs, rows)
}

/// Percent change from the previous entry, times 100.
///
/// The first entry has no previous value; a zero previous value gives no
/// finite change and is reported as `None` as well.
#[must_use]
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &value in values {
        let change = previous
            .map(|prev| (value - prev) / prev * 100.0)
            .filter(|c| c.is_finite());
        out.push(change);
        previous = Some(value);
    }
    out
}

/// Label used for quarter-start dates on chart axes.
#[must_use]
pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
