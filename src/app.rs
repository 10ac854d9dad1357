//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the database path (flag, env, default, picker)
//! - loads the sales table
//! - runs aggregation / question answering / forecasting
//! - prints reports or hands off to the TUI

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AskArgs, Command, DbArgs, ForecastArgs, ReportArgs, SeedArgs};
use crate::data::{seed_database, LoadOutcome, SalesStore, SeedSpec, DEFAULT_DB_FILE};
use crate::domain::{DashboardConfig, SalesDataset};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `pulse` and `pulse -d 2024-01-02` to behave like `pulse tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines would tear the screen there.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging();
    }

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Ask(args) => handle_ask(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Seed(args) => handle_seed(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the database path: `--db` flag, then `SALES_DB`, then the default
/// file, then (interactively) the picker.
pub fn resolve_db_path(args: &DbArgs, interactive: bool) -> Result<PathBuf, AppError> {
    if let Some(path) = &args.db {
        return Ok(path.clone());
    }
    if let Ok(path) = std::env::var("SALES_DB") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let default = PathBuf::from(DEFAULT_DB_FILE);
    if default.is_file() || !interactive {
        return Ok(default);
    }
    crate::cli::picker::prompt_for_db_path()
}

pub fn dashboard_config(args: &ReportArgs, db_path: PathBuf) -> DashboardConfig {
    DashboardConfig {
        db_path,
        target_date: args.date,
        dimension: args.by,
        top_n: args.top,
        horizon_days: crate::forecast::DEFAULT_HORIZON_DAYS,
        min_history_days: crate::forecast::MIN_HISTORY_DAYS,
        cache_ttl: Duration::from_secs(args.db.cache_ttl),
    }
}

/// Load the table once, mapping `Empty` to a user-facing message.
///
/// `DataUnavailable` and "no rows" deliberately read differently: the first
/// points at the database, the second at the seeder.
fn load_or_message(store: &SalesStore) -> Result<Option<SalesDataset>, AppError> {
    match store.load()? {
        LoadOutcome::Loaded(dataset) => Ok(Some(dataset)),
        LoadOutcome::Empty => {
            println!(
                "The sales table has no rows yet. Run `pulse seed --db {}` to add demo data.",
                store.path().display()
            );
            Ok(None)
        }
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let db_path = resolve_db_path(&args.db, true)?;
    let store = SalesStore::open(&db_path);
    let Some(dataset) = load_or_message(&store)? else {
        return Ok(());
    };

    let config = dashboard_config(&args, db_path);
    let view = pipeline::run_dashboard(&config, &dataset);

    if view.day_is_empty() {
        println!("No sales found on {}.", view.as_of);
        return Ok(());
    }

    println!(
        "{}",
        crate::report::format_day_report(
            &dataset,
            &view.summary,
            view.dimension,
            &view.breakdown,
            &view.top_reps,
            &view.top_products,
        )
    );

    match view.simple_estimate {
        Ok(estimate) => println!(
            "Simple next-day estimate (two-day mean): {}",
            crate::report::format_currency(estimate)
        ),
        Err(_) => println!("Simple next-day estimate needs the previous day's data."),
    }

    Ok(())
}

fn handle_ask(args: AskArgs) -> Result<(), AppError> {
    let db_path = resolve_db_path(&args.db, true)?;
    let store = SalesStore::open(&db_path);
    let Some(dataset) = load_or_message(&store)? else {
        return Ok(());
    };

    let question = args.question.join(" ");
    let reply = crate::query::answer(&question, &dataset);
    println!("Q: {question}");
    println!("A: {reply}");

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let db_path = resolve_db_path(&args.db, true)?;
    let store = SalesStore::open(&db_path);
    let Some(dataset) = load_or_message(&store)? else {
        return Ok(());
    };

    let as_of = dataset.resolve_date(args.date);
    let (fit, points) =
        match crate::forecast::forecast_next(&dataset, as_of, args.horizon, args.min_history) {
            Ok(result) => result,
            Err(err) => {
                // Not enough history is a warning, not a failure.
                println!("Cannot forecast: {err}.");
                return Ok(());
            }
        };

    println!("{}", crate::report::format_forecast(&fit, &points));

    if let Some(path) = &args.export {
        crate::io::write_forecast_csv(path, &points)?;
        info!(path = %path.display(), "wrote forecast CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_forecast_json(path, as_of, &fit, &points)?;
        info!(path = %path.display(), "wrote forecast JSON");
    }

    Ok(())
}

fn handle_seed(args: SeedArgs) -> Result<(), AppError> {
    // Seeding may create the file, so the picker (which lists existing files)
    // is skipped here.
    let db_path = resolve_db_path(&args.db, false)?;

    let spec = SeedSpec {
        days: args.days,
        end: args
            .end
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        seed: args.seed,
        replace: args.replace,
    };

    let report = seed_database(&db_path, &spec)?;
    println!(
        "Seeded {} row(s) over {} day(s) into {}.",
        report.rows_written,
        report.days,
        db_path.display()
    );

    Ok(())
}

/// Rewrite argv so `pulse` defaults to `pulse tui`.
///
/// Rules:
/// - `pulse`                      -> `pulse tui`
/// - `pulse -d 2024-01-02 ...`    -> `pulse tui -d 2024-01-02 ...`
/// - `pulse --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "report" | "ask" | "forecast" | "seed" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
