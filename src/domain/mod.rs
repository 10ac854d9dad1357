//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw sales rows (`SalesRecord`) and the loaded dataset (`SalesDataset`)
//! - derived per-day values (`DailyTotal`, `DaySummary`, `ForecastPoint`)
//! - the group-by dimension selector (`Dimension`)
//! - the resolved run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
