//! Synthetic sales data generator.
//!
//! Fills the `sales` table with a few weeks of plausible rows so every
//! command has something to show. The generator is seeded, so a given
//! `(seed, days)` pair always produces the same table.

use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rusqlite::Connection;
use tracing::info;

use crate::data::DataError;

const REGIONS: [&str; 4] = ["华东", "华南", "华北", "西南"];
const REPS: [&str; 5] = ["张三", "李四", "王五", "赵六", "孙琳"];

/// (category, products, base order amount in yuan)
const CATALOG: [(&str, &[&str], f64); 3] = [
    ("软件", &["智能分析平台", "数据中台", "报表系统"], 8000.0),
    ("硬件", &["服务器", "工作站", "网络设备"], 15000.0),
    ("服务", &["实施服务", "运维服务", "培训"], 4000.0),
];

#[derive(Debug, Clone)]
pub struct SeedSpec {
    /// Number of calendar days to generate, ending at `end` inclusive.
    pub days: usize,
    pub end: NaiveDate,
    pub seed: u64,
    /// Drop existing rows first instead of appending.
    pub replace: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub days: usize,
    pub rows_written: usize,
}

/// Create (if needed) and populate the `sales` table at `path`.
pub fn seed_database(path: &Path, spec: &SeedSpec) -> Result<SeedReport, DataError> {
    let mut conn = Connection::open(path)
        .map_err(|e| DataError::Unavailable(format!("{}: {e}", path.display())))?;
    let report = seed_into(&mut conn, spec)?;
    info!(
        db = %path.display(),
        rows = report.rows_written,
        days = report.days,
        "seeded sales table"
    );
    Ok(report)
}

/// Populate the `sales` table over an existing connection.
pub fn seed_into(conn: &mut Connection, spec: &SeedSpec) -> Result<SeedReport, DataError> {
    if spec.days == 0 {
        return Err(DataError::Unavailable("seed spec: days must be > 0".to_string()));
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sales (
            \"日期 (Date)\" TEXT NOT NULL,
            \"销售额 (Sales)\" REAL NOT NULL,
            \"销售区域 (Region)\" TEXT NOT NULL,
            \"销售代表 (Rep)\" TEXT NOT NULL,
            \"产品大类 (Category)\" TEXT NOT NULL,
            \"产品名称 (Product)\" TEXT NOT NULL
        )",
    )
    .map_err(|e| DataError::Unavailable(e.to_string()))?;

    if spec.replace {
        conn.execute("DELETE FROM sales", [])
            .map_err(|e| DataError::Unavailable(e.to_string()))?;
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    // Log-amount noise; exp() keeps every amount positive.
    let noise = Normal::new(0.0, 0.35)
        .map_err(|e| DataError::Unavailable(format!("noise distribution: {e}")))?;

    let tx = conn
        .transaction()
        .map_err(|e| DataError::Unavailable(e.to_string()))?;

    let mut rows_written = 0usize;
    {
        let mut insert = tx
            .prepare("INSERT INTO sales VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
            .map_err(|e| DataError::Unavailable(e.to_string()))?;

        for day_idx in 0..spec.days {
            let date = spec.end - Duration::days((spec.days - 1 - day_idx) as i64);
            // Mild upward drift plus a weekend dip, so the trend forecast has
            // something real to pick up.
            let drift = 1.0 + 0.01 * day_idx as f64;
            let weekday_factor = match date.weekday().number_from_monday() {
                6 | 7 => 0.6,
                _ => 1.0,
            };

            let orders = rng.gen_range(3..=12);
            for _ in 0..orders {
                let region = REGIONS[rng.gen_range(0..REGIONS.len())];
                let rep = REPS[rng.gen_range(0..REPS.len())];
                let (category, products, base) = CATALOG[rng.gen_range(0..CATALOG.len())];
                let product = products[rng.gen_range(0..products.len())];

                let z: f64 = noise.sample(&mut rng);
                let amount = (base * drift * weekday_factor * z.exp() * 100.0).round() / 100.0;

                insert
                    .execute(rusqlite::params![
                        date.format("%Y-%m-%d").to_string(),
                        amount,
                        region,
                        rep,
                        category,
                        product,
                    ])
                    .map_err(|e| DataError::Unavailable(e.to_string()))?;
                rows_written += 1;
            }
        }
    }

    tx.commit().map_err(|e| DataError::Unavailable(e.to_string()))?;

    Ok(SeedReport {
        days: spec.days,
        rows_written,
    })
}
