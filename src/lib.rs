//! Terminal sales KPI dashboard over a SQLite `sales` table.
//!
//! The pipeline is: load the table (through a TTL cache) -> aggregate the
//! selected day's KPIs and rankings -> fit a daily linear trend -> render as
//! a printed report, a forecast table, a question answer, or the TUI.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod metrics;
pub mod query;
pub mod report;
pub mod tui;
