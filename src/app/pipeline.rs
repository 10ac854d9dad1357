//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve day -> KPI summary -> rankings/breakdown -> history -> forecast
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;

use crate::domain::{DailyTotal, DashboardConfig, DaySummary, Dimension, ForecastPoint, SalesDataset};
use crate::forecast::{forecast_next, simple_next_day, ForecastError, TrendFit};
use crate::metrics::{daily_history, day_summary, select_day, top_n};

/// All computed outputs for one rendered day.
///
/// The forecast results stay as `Result`s: `InsufficientHistory` is a state
/// the presentation layer must show, not an abort.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub as_of: NaiveDate,
    pub dimension: Dimension,
    pub summary: DaySummary,
    pub breakdown: Vec<(String, f64)>,
    pub top_reps: Vec<(String, f64)>,
    pub top_products: Vec<(String, f64)>,
    pub history: Vec<DailyTotal>,
    pub forecast: Result<(TrendFit, Vec<ForecastPoint>), ForecastError>,
    pub simple_estimate: Result<f64, ForecastError>,
}

impl DashboardView {
    /// True when the selected day has no rows (`NoRecordsForDate`), which the
    /// caller must message differently from an unavailable database.
    pub fn day_is_empty(&self) -> bool {
        self.summary.order_count == 0
    }
}

/// Execute the full dashboard pipeline over an already-loaded dataset.
pub fn run_dashboard(config: &DashboardConfig, dataset: &SalesDataset) -> DashboardView {
    let as_of = dataset.resolve_date(config.target_date);
    let selected = select_day(dataset, as_of);

    DashboardView {
        as_of,
        dimension: config.dimension,
        summary: day_summary(dataset, as_of),
        breakdown: top_n(&selected, config.dimension, usize::MAX),
        top_reps: top_n(&selected, Dimension::Rep, config.top_n),
        top_products: top_n(&selected, Dimension::Product, config.top_n),
        history: daily_history(dataset),
        forecast: forecast_next(dataset, as_of, config.horizon_days, config.min_history_days),
        simple_estimate: simple_next_day(dataset, as_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRecord;
    use chrono::Duration;

    fn dataset(n_days: usize) -> SalesDataset {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        let records = (0..n_days)
            .map(|i| SalesRecord {
                date: start + Duration::days(i as i64),
                region: if i % 2 == 0 { "华东" } else { "华南" }.to_string(),
                rep: "张三".to_string(),
                category: "软件".to_string(),
                product: "智能分析平台".to_string(),
                amount: 100.0 + i as f64,
            })
            .collect();
        SalesDataset::from_records(records).unwrap()
    }

    #[test]
    fn view_defaults_to_newest_day() {
        let ds = dataset(12);
        let view = run_dashboard(&DashboardConfig::default(), &ds);

        assert_eq!(view.as_of, ds.stats.max_date);
        assert!(!view.day_is_empty());
        assert_eq!(view.history.len(), 12);
        assert!(view.forecast.is_ok());
        assert!(view.simple_estimate.is_ok());
    }

    #[test]
    fn short_history_still_renders_kpis() {
        let ds = dataset(4);
        let view = run_dashboard(&DashboardConfig::default(), &ds);

        assert!(!view.day_is_empty());
        assert!(matches!(
            view.forecast,
            Err(ForecastError::InsufficientHistory { have: 4, need: 10 })
        ));
    }

    #[test]
    fn requested_day_outside_range_is_clamped() {
        let ds = dataset(12);
        let config = DashboardConfig {
            target_date: Some("2030-01-01".parse().unwrap()),
            ..DashboardConfig::default()
        };
        let view = run_dashboard(&config, &ds);
        assert_eq!(view.as_of, ds.stats.max_date);
    }

    #[test]
    fn breakdown_covers_only_the_selected_day() {
        let ds = dataset(12);
        let view = run_dashboard(&DashboardConfig::default(), &ds);

        // One record per day, so exactly one group on the selected day.
        assert_eq!(view.breakdown.len(), 1);
        assert_eq!(view.top_reps.len(), 1);
    }
}
