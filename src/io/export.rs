//! Export forecast results to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{ForecastFile, ForecastPoint};
use crate::error::AppError;
use crate::forecast::TrendFit;

/// Write forecast points to a CSV file.
pub fn write_forecast_csv(
    path: &Path,
    points: &[ForecastPoint],
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "date,predicted_total")
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for p in points {
        writeln!(file, "{},{:.2}", p.date, p.predicted_total)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a forecast JSON file (fitted line + points).
pub fn write_forecast_json(
    path: &Path,
    as_of: NaiveDate,
    fit: &TrendFit,
    points: &[ForecastPoint],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to create forecast JSON '{}': {e}",
            path.display()
        ))
    })?;

    let out = ForecastFile {
        tool: "pulse".to_string(),
        as_of,
        intercept: fit.intercept,
        slope: fit.slope,
        n_history_days: fit.n_days,
        points: points.to_vec(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::usage(format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON file back (round-trip support for scripts).
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!(
            "Failed to open forecast JSON '{}': {e}",
            path.display()
        ))
    })?;
    let parsed: ForecastFile = serde_json::from_reader(file)
        .map_err(|e| AppError::usage(format!("Invalid forecast JSON: {e}")))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<ForecastPoint> {
        vec![
            ForecastPoint {
                date: "2024-01-21".parse().unwrap(),
                predicted_total: 160.0,
            },
            ForecastPoint {
                date: "2024-01-22".parse().unwrap(),
                predicted_total: 163.0,
            },
        ]
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = std::env::temp_dir().join("pulse-export-csv-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("forecast.csv");

        write_forecast_csv(&path, &sample_points()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,predicted_total");
        assert_eq!(lines[1], "2024-01-21,160.00");
        assert_eq!(lines.len(), 3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn json_export_round_trips() {
        let dir = std::env::temp_dir().join("pulse-export-json-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("forecast.json");

        let fit = TrendFit {
            intercept: 100.0,
            slope: 3.0,
            n_days: 20,
        };
        write_forecast_json(&path, "2024-01-20".parse().unwrap(), &fit, &sample_points())
            .unwrap();

        let parsed = read_forecast_json(&path).unwrap();
        assert_eq!(parsed.tool, "pulse");
        assert_eq!(parsed.n_history_days, 20);
        assert_eq!(parsed.points.len(), 2);
        assert!((parsed.slope - 3.0).abs() < 1e-12);

        std::fs::remove_file(&path).ok();
    }
}
