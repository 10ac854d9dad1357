//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the aggregation/forecast code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::Dimension;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Terminal sales KPI dashboard (SQLite-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print KPIs, rankings, and a dimension breakdown for one day.
    Report(ReportArgs),
    /// Answer a free-text question against the sales table.
    Ask(AskArgs),
    /// Fit the daily trend and print the forecast table.
    Forecast(ForecastArgs),
    /// Fill the database with synthetic demo rows.
    Seed(SeedArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `pulse report`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ReportArgs),
}

/// Database selection shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct DbArgs {
    /// SQLite database file (falls back to SALES_DB, then ./sales_database.db).
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Dataset cache freshness window in seconds (TUI only; one-shot commands
    /// always read fresh).
    #[arg(long, default_value_t = 600)]
    pub cache_ttl: u64,
}

/// Common options for the day report and the TUI.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Day to report on (YYYY-MM-DD). Defaults to the newest day on file and
    /// is clamped to the observed date range.
    #[arg(short = 'd', long)]
    pub date: Option<NaiveDate>,

    /// Breakdown dimension for the per-group chart/table.
    #[arg(long, value_enum, default_value_t = Dimension::Region)]
    pub by: Dimension,

    /// Rows in the Top-rep / Top-product ranking tables.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Options for one-shot question answering.
#[derive(Debug, Parser)]
pub struct AskArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// The question, e.g. "张三在华东的总业绩是多少？".
    #[arg(required = true, trailing_var_arg = true)]
    pub question: Vec<String>,
}

/// Options for the trend forecast.
#[derive(Debug, Parser)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Fit history up to and including this day (defaults to the newest day).
    #[arg(short = 'd', long)]
    pub date: Option<NaiveDate>,

    /// Days to project past the end of history.
    #[arg(long, default_value_t = crate::forecast::DEFAULT_HORIZON_DAYS)]
    pub horizon: usize,

    /// Distinct history days required before fitting.
    #[arg(long, default_value_t = crate::forecast::MIN_HISTORY_DAYS)]
    pub min_history: usize,

    /// Export forecast points to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the fitted line + points to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the demo-data seeder.
#[derive(Debug, Parser)]
pub struct SeedArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Number of calendar days to generate.
    #[arg(long, default_value_t = 30)]
    pub days: usize,

    /// Last generated day (defaults to today).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// RNG seed; the same seed always produces the same table.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Drop existing rows instead of appending.
    #[arg(long)]
    pub replace: bool,
}
