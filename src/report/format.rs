//! Terminal report formatting.
//!
//! All user-facing numbers go through the helpers here: currency as
//! `¥ 1,234.56` (two decimals, thousands separators), percentages with two
//! decimals. The CLI report, the TUI widgets, and the query answers share
//! these so the surfaces never disagree on formatting.

use crate::domain::{DaySummary, Dimension, ForecastPoint, SalesDataset};
use crate::forecast::TrendFit;

/// Currency with two decimals and thousands separators: `¥ 1,234.56`.
pub fn format_currency(v: f64) -> String {
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if v < 0.0 { "-" } else { "" };
    format!("¥ {sign}{}.{frac_part}", group_thousands(int_part))
}

/// Percentage with two decimals: `50.00%`.
pub fn format_pct(v: f64) -> String {
    format!("{v:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format the full day report (KPIs + rankings + dimension breakdown).
pub fn format_day_report(
    dataset: &SalesDataset,
    summary: &DaySummary,
    breakdown_dimension: Dimension,
    breakdown: &[(String, f64)],
    top_reps: &[(String, f64)],
    top_products: &[(String, f64)],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pulse — Sales Day Report {} ===\n", summary.date));
    out.push_str(&format!(
        "Data: {} record(s) | {} .. {}\n",
        dataset.stats.n_records, dataset.stats.min_date, dataset.stats.max_date
    ));
    if !dataset.row_errors.is_empty() {
        out.push_str(&format!(
            "Note: skipped {} unreadable row(s) of {} read.\n",
            dataset.row_errors.len(),
            dataset.rows_read
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "Total sales   : {} ({} vs previous day)\n",
        format_currency(summary.total),
        format_pct(summary.growth_pct)
    ));
    out.push_str(&format!("Orders        : {}\n", summary.order_count));
    out.push_str(&format!(
        "Average order : {}\n",
        summary
            .average
            .map(format_currency)
            .unwrap_or_else(|| "-".to_string())
    ));

    if !top_reps.is_empty() {
        out.push('\n');
        out.push_str("Top reps:\n");
        out.push_str(&format_group_table(top_reps));
    }
    if !top_products.is_empty() {
        out.push('\n');
        out.push_str("Top products:\n");
        out.push_str(&format_group_table(top_products));
    }
    if !breakdown.is_empty() {
        out.push('\n');
        out.push_str(&format!(
            "Sales by {}:\n",
            breakdown_dimension.display_name()
        ));
        out.push_str(&format_group_table(breakdown));
    }

    out
}

/// Format the 7-day trend forecast table.
pub fn format_forecast(fit: &TrendFit, points: &[ForecastPoint]) -> String {
    let mut out = String::new();

    out.push_str("=== pulse — Sales Trend Forecast ===\n");
    out.push_str(&format!(
        "Model: daily total = {:.2} + {:.2} × day_index (over {} day(s))\n\n",
        fit.intercept, fit.slope, fit.n_days
    ));

    out.push_str(&format!("{:<12} {:>18}\n", "date", "predicted"));
    out.push_str(&format!("{:-<12} {:-<18}\n", "", ""));
    for p in points {
        out.push_str(&format!(
            "{:<12} {:>18}\n",
            p.date.to_string(),
            format_currency(p.predicted_total)
        ));
    }

    out
}

/// Fixed-width `(key, sum)` table shared by rankings and breakdowns.
fn format_group_table(rows: &[(String, f64)]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:>18}\n", "name", "sales"));
    out.push_str(&format!("{:-<20} {:-<18}\n", "", ""));
    for (name, total) in rows {
        out.push_str(&format!(
            "{:<20} {:>18}\n",
            truncate(name, 20),
            format_currency(*total)
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SalesDataset, SalesRecord};

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "¥ 0.00");
        assert_eq!(format_currency(150.0), "¥ 150.00");
        assert_eq!(format_currency(1234.5), "¥ 1,234.50");
        assert_eq!(format_currency(1234567.891), "¥ 1,234,567.89");
        assert_eq!(format_currency(-9876.5), "¥ -9,876.50");
    }

    #[test]
    fn pct_has_two_decimals() {
        assert_eq!(format_pct(50.0), "50.00%");
        assert_eq!(format_pct(-3.333), "-3.33%");
        assert_eq!(format_pct(0.0), "0.00%");
    }

    #[test]
    fn day_report_shows_kpis_and_dash_for_missing_average() {
        let ds = SalesDataset::from_records(vec![SalesRecord {
            date: "2024-01-01".parse().unwrap(),
            region: "华东".to_string(),
            rep: "张三".to_string(),
            category: "软件".to_string(),
            product: "智能分析平台".to_string(),
            amount: 100.0,
        }])
        .unwrap();

        let summary = DaySummary {
            date: "2024-01-02".parse().unwrap(),
            total: 0.0,
            order_count: 0,
            average: None,
            previous_total: 100.0,
            growth_pct: 0.0,
        };

        let report = format_day_report(&ds, &summary, Dimension::Region, &[], &[], &[]);
        assert!(report.contains("Total sales   : ¥ 0.00"));
        assert!(report.contains("Average order : -"));
        assert!(report.contains("0.00% vs previous day"));
    }

    #[test]
    fn forecast_table_has_one_line_per_point() {
        let fit = TrendFit {
            intercept: 100.0,
            slope: 3.0,
            n_days: 20,
        };
        let points = vec![
            ForecastPoint {
                date: "2024-01-21".parse().unwrap(),
                predicted_total: 160.0,
            },
            ForecastPoint {
                date: "2024-01-22".parse().unwrap(),
                predicted_total: 163.0,
            },
        ];

        let text = format_forecast(&fit, &points);
        assert!(text.contains("100.00 + 3.00 × day_index"));
        assert!(text.contains("2024-01-21"));
        assert!(text.contains("¥ 160.00"));
        assert_eq!(text.lines().count(), 2 + 1 + 2 + 2);
    }
}
