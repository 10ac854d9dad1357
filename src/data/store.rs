//! SQLite ingest for the `sales` table.
//!
//! The table is the one bit-exact external contract: six columns with
//! bilingual labels such as `日期 (Date)`, as written by `pulse seed`. We
//! accept those labels verbatim and also plain English names, so hand-built
//! fixture tables keep working.
//!
//! Design goals:
//! - **Explicit outcomes**: `Loaded` / `Empty` / `Err(DataError)` are three
//!   different things; callers never have to guess whether an empty dataset
//!   means "no rows" or "no database".
//! - **Row-level validation**: a bad date or amount skips that row and is
//!   reported, it does not abort the load.
//! - **Read-only**: the dashboard never writes through this path.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::debug;

use crate::domain::{RowError, SalesDataset, SalesRecord};

/// Database file used when neither `--db` nor `SALES_DB` is given.
pub const DEFAULT_DB_FILE: &str = "sales_database.db";

/// Loader failure taxonomy. All variants are recoverable at the surface that
/// sees them; none abort the process.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    /// Source or table missing/unreadable.
    #[error("sales database unavailable: {0}")]
    Unavailable(String),
    /// The table exists but a required column could not be resolved.
    #[error("unexpected `sales` schema: no column for `{0}`")]
    MissingColumn(&'static str),
}

/// Result of one load pass.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// At least one usable row.
    Loaded(SalesDataset),
    /// The table exists but holds no usable rows.
    Empty,
}

/// Handle on the sales database. Opens a fresh read-only connection per load;
/// the TTL cache above this keeps load frequency low.
#[derive(Debug, Clone)]
pub struct SalesStore {
    path: PathBuf,
}

impl SalesStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute `SELECT * FROM sales` and normalize the rows.
    pub fn load(&self) -> Result<LoadOutcome, DataError> {
        // Refuse to create an empty database file on a typo'd path; a missing
        // file must read as "unavailable", not as an empty table.
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| DataError::Unavailable(format!("{}: {e}", self.path.display())))?;

        let outcome = read_sales_table(&conn)?;
        if let LoadOutcome::Loaded(dataset) = &outcome {
            debug!(
                rows_read = dataset.rows_read,
                rows_used = dataset.records.len(),
                skipped = dataset.row_errors.len(),
                "loaded sales table"
            );
        }
        Ok(outcome)
    }
}

/// Columns we need, in `SalesRecord` order.
const COLUMNS: [(&'static str, &[&str]); 6] = [
    ("date", &["日期 (date)", "date", "日期"]),
    ("amount", &["销售额 (sales)", "sales", "amount", "销售额"]),
    ("region", &["销售区域 (region)", "region", "销售区域"]),
    ("rep", &["销售代表 (rep)", "rep", "销售代表"]),
    ("category", &["产品大类 (category)", "category", "产品大类"]),
    ("product", &["产品名称 (product)", "product", "产品名称"]),
];

/// Read and normalize the table over an existing connection.
///
/// Split out from [`SalesStore::load`] so tests can run against an in-memory
/// database.
pub fn read_sales_table(conn: &Connection) -> Result<LoadOutcome, DataError> {
    let mut stmt = conn
        .prepare("SELECT * FROM sales")
        .map_err(|e| DataError::Unavailable(e.to_string()))?;

    let names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|n| n.trim().to_lowercase())
        .collect();
    let indices = resolve_columns(&names)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    let mut rows = stmt
        .query([])
        .map_err(|e| DataError::Unavailable(e.to_string()))?;
    while let Some(row) = rows
        .next()
        .map_err(|e| DataError::Unavailable(e.to_string()))?
    {
        rows_read += 1;
        match parse_row(row, &indices) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError {
                row: rows_read,
                message,
            }),
        }
    }

    match SalesDataset::from_records(records) {
        Some(mut dataset) => {
            dataset.row_errors = row_errors;
            dataset.rows_read = rows_read;
            Ok(LoadOutcome::Loaded(dataset))
        }
        None => Ok(LoadOutcome::Empty),
    }
}

/// Map our six logical columns onto the table's actual column order.
fn resolve_columns(lower_names: &[String]) -> Result<[usize; 6], DataError> {
    let mut out = [0usize; 6];
    for (slot, (logical, aliases)) in COLUMNS.iter().enumerate() {
        let found = lower_names
            .iter()
            .position(|name| aliases.iter().any(|a| name == a));
        match found {
            Some(idx) => out[slot] = idx,
            None => return Err(DataError::MissingColumn(logical)),
        }
    }
    Ok(out)
}

fn parse_row(row: &rusqlite::Row<'_>, indices: &[usize; 6]) -> Result<SalesRecord, String> {
    let date_raw = text_at(row, indices[0], "date")?;
    let date = parse_day(&date_raw).ok_or_else(|| format!("unparseable date '{date_raw}'"))?;

    let amount = match row.get_ref(indices[1]).map_err(|e| e.to_string())? {
        ValueRef::Integer(v) => v as f64,
        ValueRef::Real(v) => v,
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes)
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("unparseable amount: {e}"))?,
        other => return Err(format!("unexpected amount type {}", other.data_type())),
    };
    if !amount.is_finite() {
        return Err("non-finite amount".to_string());
    }

    Ok(SalesRecord {
        date,
        region: text_at(row, indices[2], "region")?,
        rep: text_at(row, indices[3], "rep")?,
        category: text_at(row, indices[4], "category")?,
        product: text_at(row, indices[5], "product")?,
        amount,
    })
}

fn text_at(row: &rusqlite::Row<'_>, idx: usize, what: &str) -> Result<String, String> {
    row.get::<_, String>(idx)
        .map_err(|e| format!("bad {what} value: {e}"))
}

/// Parse a stored date down to calendar-day precision.
///
/// The seeder writes plain `YYYY-MM-DD`, but exports that carry a time
/// component must still land on the same calendar day, so datetime forms are
/// accepted and truncated.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fixture table with the bilingual column labels.
    pub(crate) fn fixture_conn(rows: &[(&str, f64, &str, &str, &str, &str)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (
                \"日期 (Date)\" TEXT,
                \"销售额 (Sales)\" REAL,
                \"销售区域 (Region)\" TEXT,
                \"销售代表 (Rep)\" TEXT,
                \"产品大类 (Category)\" TEXT,
                \"产品名称 (Product)\" TEXT
            )",
        )
        .unwrap();
        for (date, amount, region, rep, category, product) in rows {
            conn.execute(
                "INSERT INTO sales VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![date, amount, region, rep, category, product],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn loads_bilingual_schema() {
        let conn = fixture_conn(&[
            ("2024-01-01", 100.0, "华东", "张三", "软件", "智能分析平台"),
            ("2024-01-02", 150.0, "华南", "李四", "硬件", "服务器"),
        ]);

        let outcome = read_sales_table(&conn).unwrap();
        let LoadOutcome::Loaded(ds) = outcome else {
            panic!("expected Loaded");
        };
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.records[0].region, "华东");
        assert_eq!(ds.stats.max_date, "2024-01-02".parse().unwrap());
        assert!(ds.row_errors.is_empty());
    }

    #[test]
    fn empty_table_reads_as_empty_not_error() {
        let conn = fixture_conn(&[]);
        assert!(matches!(read_sales_table(&conn).unwrap(), LoadOutcome::Empty));
    }

    #[test]
    fn missing_table_is_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let err = read_sales_table(&conn).unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE sales (date TEXT, amount REAL)")
            .unwrap();
        let err = read_sales_table(&conn).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn("region")));
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let conn = fixture_conn(&[
            ("2024-01-01", 100.0, "华东", "张三", "软件", "智能分析平台"),
            ("not-a-date", 50.0, "华东", "张三", "软件", "智能分析平台"),
        ]);

        let LoadOutcome::Loaded(ds) = read_sales_table(&conn).unwrap() else {
            panic!("expected Loaded");
        };
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.rows_read, 2);
        assert_eq!(ds.row_errors.len(), 1);
        assert_eq!(ds.row_errors[0].row, 2);
    }

    #[test]
    fn datetime_values_truncate_to_calendar_day() {
        let conn = fixture_conn(&[
            ("2024-01-01 09:15:00", 10.0, "华东", "张三", "软件", "智能分析平台"),
            ("2024-01-01 18:40:00", 20.0, "华东", "张三", "软件", "智能分析平台"),
        ]);

        let LoadOutcome::Loaded(ds) = read_sales_table(&conn).unwrap() else {
            panic!("expected Loaded");
        };
        let day: NaiveDate = "2024-01-01".parse().unwrap();
        assert!(ds.records.iter().all(|r| r.date == day));
    }

    #[test]
    fn english_column_names_also_resolve() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (date TEXT, amount REAL, region TEXT, rep TEXT, category TEXT, product TEXT);
             INSERT INTO sales VALUES ('2024-03-05', 42.5, 'East', 'Alice', 'Software', 'Analyzer');",
        )
        .unwrap();

        let LoadOutcome::Loaded(ds) = read_sales_table(&conn).unwrap() else {
            panic!("expected Loaded");
        };
        assert_eq!(ds.records[0].rep, "Alice");
        assert!((ds.records[0].amount - 42.5).abs() < 1e-9);
    }
}
