//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and forecasting
//! - exported to JSON/CSV
//! - rendered by both the CLI report and the TUI

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One row of the `sales` table.
///
/// `amount >= 0` is assumed but not enforced; the upstream table is treated as
/// the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub region: String,
    pub rep: String,
    pub category: String,
    pub product: String,
    pub amount: f64,
}

/// Summary stats over the loaded records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub total_amount: f64,
}

/// A row-level problem encountered while reading the table.
///
/// Bad rows are skipped, not fatal; the count is surfaced so the user can tell
/// the dashboard is working from a partial read.
#[derive(Debug, Clone)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// The loaded sales table, immutable within a render pass.
///
/// Constructed wholesale by the loader (or served from the TTL cache) and
/// consumed read-only by every downstream computation.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    pub records: Vec<SalesRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl SalesDataset {
    /// Build a dataset from records, computing stats.
    ///
    /// Returns `None` when `records` is empty (an empty table is represented
    /// as `LoadOutcome::Empty`, never as a dataset with no stats).
    pub fn from_records(records: Vec<SalesRecord>) -> Option<Self> {
        let stats = compute_stats(&records)?;
        let rows_read = records.len();
        Some(Self {
            records,
            stats,
            row_errors: Vec::new(),
            rows_read,
        })
    }

    /// Clamp a requested date to the observed date range.
    ///
    /// `None` means "latest": the newest day on file.
    pub fn resolve_date(&self, requested: Option<NaiveDate>) -> NaiveDate {
        match requested {
            None => self.stats.max_date,
            Some(d) => d.clamp(self.stats.min_date, self.stats.max_date),
        }
    }
}

fn compute_stats(records: &[SalesRecord]) -> Option<DatasetStats> {
    let first = records.first()?;
    let mut min_date = first.date;
    let mut max_date = first.date;
    let mut total_amount = 0.0;

    for r in records {
        min_date = min_date.min(r.date);
        max_date = max_date.max(r.date);
        total_amount += r.amount;
    }

    Some(DatasetStats {
        n_records: records.len(),
        min_date,
        max_date,
        total_amount,
    })
}

/// One calendar day's total sales. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// A projected future day. Ephemeral; discarded after render/export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_total: f64,
}

/// KPI block for one selected day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: f64,
    pub order_count: usize,
    /// Mean order amount. `None` when the day has no rows; callers must not
    /// substitute 0 here (a zero average and "no orders" read differently).
    pub average: Option<f64>,
    pub previous_total: f64,
    /// Day-over-day growth in percent. Defined as 0 when the previous day's
    /// total is zero or absent.
    pub growth_pct: f64,
}

/// A saved forecast file (JSON): the fitted line plus the projected points.
///
/// This is the "portable" representation of one forecast run, consumable by
/// spreadsheets or downstream scripts without re-running the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub as_of: NaiveDate,
    pub intercept: f64,
    pub slope: f64,
    pub n_history_days: usize,
    pub points: Vec<ForecastPoint>,
}

/// Group-by key for breakdowns and rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Region,
    Product,
    Category,
    Rep,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Region,
        Dimension::Product,
        Dimension::Category,
        Dimension::Rep,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Dimension::Region => "region",
            Dimension::Product => "product",
            Dimension::Category => "category",
            Dimension::Rep => "rep",
        }
    }

    /// The record field this dimension groups by.
    pub fn key<'a>(self, record: &'a SalesRecord) -> &'a str {
        match self {
            Dimension::Region => &record.region,
            Dimension::Product => &record.product,
            Dimension::Category => &record.category,
            Dimension::Rep => &record.rep,
        }
    }

    /// Cycle to the next dimension (TUI selector).
    pub fn next(self) -> Self {
        match self {
            Dimension::Region => Dimension::Product,
            Dimension::Product => Dimension::Category,
            Dimension::Category => Dimension::Rep,
            Dimension::Rep => Dimension::Region,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus defaults (and `SALES_DB` for the path).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub db_path: PathBuf,
    /// Requested day; `None` means the dataset's newest day.
    pub target_date: Option<NaiveDate>,
    pub dimension: Dimension,
    pub top_n: usize,
    pub horizon_days: usize,
    pub min_history_days: usize,
    pub cache_ttl: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(crate::data::DEFAULT_DB_FILE),
            target_date: None,
            dimension: Dimension::Region,
            top_n: 5,
            horizon_days: 7,
            min_history_days: 10,
            cache_ttl: Duration::from_secs(600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, amount: f64) -> SalesRecord {
        SalesRecord {
            date: date.parse().unwrap(),
            region: "华东".to_string(),
            rep: "张三".to_string(),
            category: "软件".to_string(),
            product: "智能分析平台".to_string(),
            amount,
        }
    }

    #[test]
    fn stats_cover_date_range_and_total() {
        let ds = SalesDataset::from_records(vec![
            record("2024-01-03", 10.0),
            record("2024-01-01", 20.0),
            record("2024-01-02", 30.0),
        ])
        .unwrap();

        assert_eq!(ds.stats.n_records, 3);
        assert_eq!(ds.stats.min_date, "2024-01-01".parse::<NaiveDate>().unwrap());
        assert_eq!(ds.stats.max_date, "2024-01-03".parse::<NaiveDate>().unwrap());
        assert!((ds.stats.total_amount - 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_records_produce_no_dataset() {
        assert!(SalesDataset::from_records(Vec::new()).is_none());
    }

    #[test]
    fn resolve_date_clamps_to_observed_range() {
        let ds = SalesDataset::from_records(vec![
            record("2024-01-02", 1.0),
            record("2024-01-05", 1.0),
        ])
        .unwrap();

        assert_eq!(ds.resolve_date(None), "2024-01-05".parse().unwrap());
        assert_eq!(
            ds.resolve_date(Some("2023-12-25".parse().unwrap())),
            "2024-01-02".parse().unwrap()
        );
        assert_eq!(
            ds.resolve_date(Some("2024-02-01".parse().unwrap())),
            "2024-01-05".parse().unwrap()
        );
        assert_eq!(
            ds.resolve_date(Some("2024-01-03".parse().unwrap())),
            "2024-01-03".parse().unwrap()
        );
    }
}
