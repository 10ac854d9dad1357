//! Least squares solver for the daily trend line.
//!
//! The forecast model is a single-feature linear regression:
//!
//! ```text
//! minimize Σ (total_i - (a + b * offset_i))^2
//! ```
//!
//! where `offset_i` is the integer day index since the earliest observed day.
//!
//! Implementation choices:
//! - We build the tall `n x 2` design matrix (intercept column + day offset)
//!   and solve via SVD, which stays robust even when the history is short or
//!   the totals are nearly constant.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - History lengths are tiny (tens to hundreds of days), so SVD cost is
//!   irrelevant here.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x` and return `(intercept, slope)`.
///
/// Returns `None` when fewer than two points are given, when `xs`/`ys`
/// lengths differ, or when the solve fails (e.g. all x values identical).
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let n = xs.len();
    let mut design = DMatrix::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_exact_trend() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 100.0 + 3.0 * x).collect();

        let (a, b) = fit_line(&xs, &ys).unwrap();
        assert!((a - 100.0).abs() < 1e-8);
        assert!((b - 3.0).abs() < 1e-8);
    }

    #[test]
    fn fit_line_handles_noisy_points() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.1, 2.9, 5.2, 6.8];

        let (a, b) = fit_line(&xs, &ys).unwrap();
        // Slope should be close to 2, intercept close to 1.
        assert!((b - 2.0).abs() < 0.2);
        assert!((a - 1.0).abs() < 0.3);
    }

    #[test]
    fn fit_line_rejects_degenerate_input() {
        assert!(fit_line(&[1.0], &[2.0]).is_none());
        assert!(fit_line(&[1.0, 2.0], &[1.0]).is_none());
    }
}
