//! Daily-trend forecasting.
//!
//! Two estimators, both over per-day totals:
//!
//! - `forecast_next`: ordinary least squares on a day-index feature (integer
//!   days since the earliest observed day), projected over a 7-day horizon.
//!   Requires a minimum amount of distinct history; refusing to extrapolate
//!   from a handful of days is part of the contract.
//! - `simple_next_day`: the basic dashboard's estimate — the mean of the
//!   selected and previous day's totals.
//!
//! No confidence intervals, seasonality, or outlier handling; this is a
//! single-feature linear trend only.

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::debug;

use crate::domain::{DailyTotal, ForecastPoint, SalesDataset};
use crate::math::fit_line;
use crate::metrics::{select_day, sum_amount};

/// Distinct days of history required before the regression is attempted.
pub const MIN_HISTORY_DAYS: usize = 10;

/// Default projection horizon in days.
pub const DEFAULT_HORIZON_DAYS: usize = 7;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForecastError {
    /// Not enough distinct days on or before the as-of date. Recoverable;
    /// callers display the shortfall and skip the forecast.
    #[error("insufficient history: {have} day(s) available, {need} required")]
    InsufficientHistory { have: usize, need: usize },
    /// The solver rejected the system (e.g. degenerate day offsets).
    #[error("trend fit failed: {0}")]
    Degenerate(String),
}

/// The fitted daily trend line.
#[derive(Debug, Clone, Copy)]
pub struct TrendFit {
    pub intercept: f64,
    pub slope: f64,
    pub n_days: usize,
}

impl TrendFit {
    pub fn predict(&self, day_offset: f64) -> f64 {
        self.intercept + self.slope * day_offset
    }
}

/// Aggregate history on or before `as_of` into one total per calendar day,
/// ascending by date.
pub fn history_until(dataset: &SalesDataset, as_of: NaiveDate) -> Vec<DailyTotal> {
    let mut sums: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();
    for r in dataset.records.iter().filter(|r| r.date <= as_of) {
        *sums.entry(r.date).or_insert(0.0) += r.amount;
    }
    sums.into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Fit the OLS trend over per-day totals.
///
/// The day-index feature is the signed day count from the earliest entry, so
/// gaps in the calendar keep their true spacing.
pub fn fit_trend(history: &[DailyTotal], min_days: usize) -> Result<TrendFit, ForecastError> {
    if history.len() < min_days {
        return Err(ForecastError::InsufficientHistory {
            have: history.len(),
            need: min_days,
        });
    }

    let origin = history[0].date;
    let xs: Vec<f64> = history
        .iter()
        .map(|d| (d.date - origin).num_days() as f64)
        .collect();
    let ys: Vec<f64> = history.iter().map(|d| d.total).collect();

    let (intercept, slope) = fit_line(&xs, &ys)
        .ok_or_else(|| ForecastError::Degenerate("least squares solve failed".to_string()))?;

    debug!(n_days = history.len(), intercept, slope, "fitted daily trend");

    Ok(TrendFit {
        intercept,
        slope,
        n_days: history.len(),
    })
}

/// Project `horizon_days` future days from the history on or before `as_of`.
///
/// Offsets `max_offset+1 ..= max_offset+horizon` map back to
/// `max_date + 1 ..= max_date + horizon`.
pub fn forecast_next(
    dataset: &SalesDataset,
    as_of: NaiveDate,
    horizon_days: usize,
    min_days: usize,
) -> Result<(TrendFit, Vec<ForecastPoint>), ForecastError> {
    let history = history_until(dataset, as_of);
    let fit = fit_trend(&history, min_days)?;

    // fit_trend guarantees non-empty history here.
    let origin = history[0].date;
    let last = history[history.len() - 1].date;
    let max_offset = (last - origin).num_days();

    let mut points = Vec::with_capacity(horizon_days);
    for step in 1..=horizon_days as i64 {
        points.push(ForecastPoint {
            date: last + Duration::days(step),
            predicted_total: fit.predict((max_offset + step) as f64),
        });
    }

    Ok((fit, points))
}

/// The basic one-day-ahead estimate: mean of the selected and previous day's
/// totals. Needs the previous day to have at least one row.
pub fn simple_next_day(dataset: &SalesDataset, date: NaiveDate) -> Result<f64, ForecastError> {
    let previous = select_day(dataset, date - Duration::days(1));
    if previous.is_empty() {
        return Err(ForecastError::InsufficientHistory { have: 1, need: 2 });
    }

    let today_total = sum_amount(&select_day(dataset, date));
    let previous_total = sum_amount(&previous);
    Ok((today_total + previous_total) / 2.0)
}
