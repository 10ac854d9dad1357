//! Day filtering and KPI aggregation.
//!
//! Everything here is a pure function over a borrowed dataset:
//!
//! - slice one calendar day (`select_day`)
//! - KPI block for a day, including day-over-day growth (`day_summary`)
//! - group sums per dimension for breakdowns and rankings (`group_totals`)
//! - the whole-history daily series (`daily_history`)
//!
//! Ordering is part of the contract where it matters: group totals come back
//! sorted descending by sum so top-N is a plain truncation.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::domain::{DailyTotal, DaySummary, Dimension, SalesDataset, SalesRecord};

/// Rows whose calendar date equals `date`. Time-of-day never participates;
/// the loader already truncated stored datetimes to days.
pub fn select_day<'a>(dataset: &'a SalesDataset, date: NaiveDate) -> Vec<&'a SalesRecord> {
    dataset
        .records
        .iter()
        .filter(|r| r.date == date)
        .collect()
}

pub fn sum_amount(rows: &[&SalesRecord]) -> f64 {
    rows.iter().map(|r| r.amount).sum()
}

/// Day-over-day growth in percent.
///
/// Defined as 0 when the previous total is zero or negative. A day with no
/// prior data reads as flat rather than dividing by zero; `previous_total`
/// is kept on the summary for callers that need the distinction.
pub fn growth_rate(today_total: f64, yesterday_total: f64) -> f64 {
    if yesterday_total > 0.0 {
        (today_total - yesterday_total) / yesterday_total * 100.0
    } else {
        0.0
    }
}

/// KPI block for `date`: total, order count, mean order value, and growth
/// against the immediately preceding calendar day.
pub fn day_summary(dataset: &SalesDataset, date: NaiveDate) -> DaySummary {
    let selected = select_day(dataset, date);
    let previous = select_day(dataset, date - Duration::days(1));

    let total = sum_amount(&selected);
    let previous_total = sum_amount(&previous);
    let order_count = selected.len();
    let average = if order_count > 0 {
        Some(total / order_count as f64)
    } else {
        None
    };

    DaySummary {
        date,
        total,
        order_count,
        average,
        previous_total,
        growth_pct: growth_rate(total, previous_total),
    }
}

/// Sum of `amount` per distinct value of `dimension`, sorted descending by
/// sum (ties broken by key so the order is deterministic).
pub fn group_totals(rows: &[&SalesRecord], dimension: Dimension) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *sums.entry(dimension.key(r)).or_insert(0.0) += r.amount;
    }

    let mut out: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    out
}

/// The largest `n` groups by sum.
pub fn top_n(rows: &[&SalesRecord], dimension: Dimension, n: usize) -> Vec<(String, f64)> {
    let mut totals = group_totals(rows, dimension);
    totals.truncate(n);
    totals
}

/// One `DailyTotal` per calendar day over the whole dataset, ascending by
/// date. Days with no rows are absent, not zero-filled.
pub fn daily_history(dataset: &SalesDataset) -> Vec<DailyTotal> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in &dataset.records {
        *sums.entry(r.date).or_insert(0.0) += r.amount;
    }
    sums.into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, region: &str, rep: &str, amount: f64) -> SalesRecord {
        SalesRecord {
            date: date.parse().unwrap(),
            region: region.to_string(),
            rep: rep.to_string(),
            category: "软件".to_string(),
            product: "智能分析平台".to_string(),
            amount,
        }
    }

    fn dataset(records: Vec<SalesRecord>) -> SalesDataset {
        SalesDataset::from_records(records).unwrap()
    }

    #[test]
    fn two_day_scenario_kpis() {
        // dataset = [(2024-01-01, East, 100), (2024-01-02, East, 150)]
        let ds = dataset(vec![
            record("2024-01-01", "East", "Alice", 100.0),
            record("2024-01-02", "East", "Alice", 150.0),
        ]);

        let summary = day_summary(&ds, "2024-01-02".parse().unwrap());
        assert!((summary.total - 150.0).abs() < 1e-9);
        assert!((summary.previous_total - 100.0).abs() < 1e-9);
        assert!((summary.growth_pct - 50.0).abs() < 1e-9);
        assert_eq!(summary.order_count, 1);
        assert!((summary.average.unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn empty_day_has_zero_kpis_and_no_average() {
        let ds = dataset(vec![record("2024-01-01", "East", "Alice", 100.0)]);
        let day: NaiveDate = "2024-03-01".parse().unwrap();

        assert!(select_day(&ds, day).is_empty());
        let summary = day_summary(&ds, day);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.average, None);
        assert_eq!(summary.growth_pct, 0.0);
    }

    #[test]
    fn growth_is_zero_when_yesterday_is_zero() {
        assert_eq!(growth_rate(500.0, 0.0), 0.0);
        assert!((growth_rate(150.0, 100.0) - 50.0).abs() < 1e-9);
        assert!((growth_rate(80.0, 100.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn group_totals_sort_descending_with_deterministic_ties() {
        let ds = dataset(vec![
            record("2024-01-01", "华东", "张三", 100.0),
            record("2024-01-01", "华南", "李四", 300.0),
            record("2024-01-01", "华东", "王五", 150.0),
            record("2024-01-01", "西南", "赵六", 250.0),
        ]);
        let rows = select_day(&ds, "2024-01-01".parse().unwrap());

        let totals = group_totals(&rows, Dimension::Region);
        assert_eq!(
            totals,
            vec![
                ("华南".to_string(), 300.0),
                ("华东".to_string(), 250.0),
                ("西南".to_string(), 250.0),
            ]
        );

        let top = top_n(&rows, Dimension::Rep, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "李四");
    }

    #[test]
    fn daily_history_is_ascending_and_skips_missing_days() {
        let ds = dataset(vec![
            record("2024-01-03", "华东", "张三", 30.0),
            record("2024-01-01", "华东", "张三", 10.0),
            record("2024-01-01", "华南", "李四", 15.0),
        ]);

        let history = daily_history(&ds);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "2024-01-01".parse().unwrap());
        assert!((history[0].total - 25.0).abs() < 1e-9);
        assert_eq!(history[1].date, "2024-01-03".parse().unwrap());
    }
}
