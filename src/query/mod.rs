//! Keyword question answering over the loaded dataset.
//!
//! This is containment matching, not NLP: every distinct rep/region/category
//! value present in the data is tested for case-insensitive containment in
//! the question. Matched dimensions intersect — a record must satisfy every
//! matched dimension. Short values can false-positive inside unrelated words;
//! that is accepted for this matcher.

use std::collections::BTreeSet;

use crate::domain::{Dimension, SalesDataset, SalesRecord};
use crate::metrics::sum_amount;
use crate::report::format_currency;

/// Question triggers for the count branch. Anything else reports a sum.
const COUNT_TRIGGERS: [&str; 4] = ["订单", "卖了多少笔", "order", "how many sold"];

/// Dimensions whose values participate in matching. Product names are long
/// and rarely typed verbatim, so they are not matched.
const MATCH_DIMENSIONS: [Dimension; 3] = [Dimension::Rep, Dimension::Region, Dimension::Category];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    OrderCount,
    TotalSales,
}

/// One matched dimension with every value of it found in the question.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedFilter {
    pub dimension: Dimension,
    pub values: Vec<String>,
}

pub fn detect_intent(query: &str) -> Intent {
    let lowered = query.to_lowercase();
    if COUNT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        Intent::OrderCount
    } else {
        Intent::TotalSales
    }
}

/// Find every known dimension value contained in the question.
pub fn extract_filters(query: &str, dataset: &SalesDataset) -> Vec<MatchedFilter> {
    let lowered = query.to_lowercase();
    let mut out = Vec::new();

    for dimension in MATCH_DIMENSIONS {
        // BTreeSet keeps match order deterministic across runs.
        let distinct: BTreeSet<&str> =
            dataset.records.iter().map(|r| dimension.key(r)).collect();

        let values: Vec<String> = distinct
            .into_iter()
            .filter(|v| !v.is_empty() && lowered.contains(&v.to_lowercase()))
            .map(|v| v.to_string())
            .collect();

        if !values.is_empty() {
            out.push(MatchedFilter { dimension, values });
        }
    }

    out
}

/// Rows satisfying every matched dimension. No filters means the whole
/// dataset.
pub fn apply_filters<'a>(
    dataset: &'a SalesDataset,
    filters: &[MatchedFilter],
) -> Vec<&'a SalesRecord> {
    dataset
        .records
        .iter()
        .filter(|r| {
            filters.iter().all(|f| {
                let key = f.dimension.key(r);
                f.values.iter().any(|v| v == key)
            })
        })
        .collect()
}

/// Answer a free-text question with a count or a currency-formatted total.
pub fn answer(query: &str, dataset: &SalesDataset) -> String {
    let filters = extract_filters(query, dataset);
    let rows = apply_filters(dataset, &filters);

    match detect_intent(query) {
        Intent::OrderCount => format!("Found {} matching order(s).", rows.len()),
        Intent::TotalSales => format!(
            "Total sales for the match: {}",
            format_currency(sum_amount(&rows))
        ),
    }
}
