//! Least squares solvers.
//!
//! The engine solves two kinds of small regression problems:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2            (trend lines)
//! minimize Σ (y_i - x_i^T β)^2 + λ Σ β_j^2 (additive regression, ridge on chosen columns)
//! ```
//!
//! Both go through SVD so tall and nearly collinear designs are handled without
//! panicking. (Nalgebra's `QR::solve` is intended for square systems.)

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

/// Ridge regression by row augmentation.
///
/// Appends `sqrt(λ)·e_j` rows for every column `j` in `penalized`, so the
/// penalty only shrinks those coefficients.
pub fn solve_ridge(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambda: f64,
    penalized: &[usize],
) -> Option<DVector<f64>> {
    if penalized.is_empty() || lambda <= 0.0 {
        return solve_least_squares(x, y);
    }
    let (n, p) = x.shape();
    let extra = penalized.len();
    let mut xa = DMatrix::<f64>::zeros(n + extra, p);
    let mut ya = DVector::<f64>::zeros(n + extra);
    xa.rows_mut(0, n).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);
    let w = lambda.sqrt();
    for (r, &col) in penalized.iter().enumerate() {
        if col < p {
            xa[(n + r, col)] = w;
        }
    }
    solve_least_squares(&xa, &ya)
}

/// Fit `y = a + b·i` over the index `i = 0..n`. Returns `(a, b)`.
pub fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    for i in 0..n {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = i as f64;
    }
    let y = DVector::from_row_slice(values);
    let beta = solve_least_squares(&x, &y)?;
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
    fn linear_fit_recovers_slope() {
        let values: Vec<f64> = (0..10).map(|i| 4.0 - 0.5 * i as f64).collect();
        let (a, b) = linear_fit(&values).unwrap();
        assert!((a - 4.0).abs() < 1e-9);
        assert!((b + 0.5).abs() < 1e-9);
    }

    #[test]
    fn ridge_shrinks_only_penalized_columns() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0]);
        let y = DVector::from_row_slice(&[3.0, 1.0, 3.0, 1.0]);
        let ols = solve_least_squares(&x, &y).unwrap();
        let ridge = solve_ridge(&x, &y, 10.0, &[1]).unwrap();
        assert!((ols[1] - 1.0).abs() < 1e-9);
        assert!(ridge[1].abs() < ols[1].abs());
        assert!((ridge[0] - 2.0).abs() < 1e-9);
    }
}
