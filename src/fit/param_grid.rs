//! Parameter grids and deterministic parallel grid search.
//!
//! Smoothing and ARIMA coefficients are chosen by grid search rather than a
//! gradient optimizer:
//! - the result is deterministic given the same inputs and grid resolution
//! - there are no local-minimum or convergence failures to handle
//! - with 1–3 parameters a modest grid is fast enough per request

use rayon::prelude::*;

use crate::error::ModelFitError;
use crate::models::FitDeadline;

/// `steps` evenly spaced points between `min` and `max` (inclusive). `steps` is floored at 2.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(2);
    let step = (max - min) / (steps as f64 - 1.0);
    (0..steps).map(|i| min + step * i as f64).collect()
}

/// Cartesian product of two axes, row-major.
pub fn grid_2d(a: &[f64], b: &[f64]) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for &x in a {
        for &y in b {
            out.push(vec![x, y]);
        }
    }
    out
}

/// Cartesian product of three axes, row-major.
pub fn grid_3d(a: &[f64], b: &[f64], c: &[f64]) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(a.len() * b.len() * c.len());
    for &x in a {
        for &y in b {
            for &z in c {
                out.push(vec![x, y, z]);
            }
        }
    }
    out
}

/// A finer axis of `steps` points spanning `center ± radius`, clamped to `[lo, hi]`.
pub fn refine_axis(center: f64, radius: f64, steps: usize, lo: f64, hi: f64) -> Vec<f64> {
    linspace((center - radius).max(lo), (center + radius).min(hi), steps)
}

/// Evaluate `objective` on every grid point in parallel and return the best
/// `(index, params, score)`.
///
/// Points whose objective is `None` or non-finite are skipped. Ties are broken by
/// grid index so the result does not depend on thread scheduling.
pub fn argmin_on_grid<F>(
    grid: &[Vec<f64>],
    deadline: &FitDeadline,
    objective: F,
) -> Result<(usize, Vec<f64>, f64), ModelFitError>
where
    F: Fn(&[f64]) -> Option<f64> + Sync,
{
    let scored: Vec<(usize, f64)> = grid
        .par_iter()
        .enumerate()
        .map(|(idx, params)| {
            deadline.check()?;
            Ok(objective(params)
                .filter(|s| s.is_finite())
                .map(|s| (idx, s)))
        })
        .collect::<Result<Vec<Option<(usize, f64)>>, ModelFitError>>()?
        .into_iter()
        .flatten()
        .collect();

    let Some(&first) = scored.first() else {
        return Err(ModelFitError::NonFinite);
    };
    let mut best = first;
    for &(idx, score) in &scored[1..] {
        if score < best.1 || (score == best.1 && idx < best.0) {
            best = (idx, score);
        }
    }
    Ok((best.0, grid[best.0].clone(), best.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FitContext;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.1, 0.9, 5);
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[4] - 0.9).abs() < 1e-12);
        assert!((v[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn grids_are_full_products() {
        assert_eq!(grid_2d(&[1.0, 2.0], &[3.0, 4.0, 5.0]).len(), 6);
        assert_eq!(grid_3d(&[1.0, 2.0], &[3.0], &[4.0, 5.0]).len(), 4);
    }

    #[test]
    fn argmin_breaks_ties_by_index() {
        let grid = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let deadline = FitContext::default().deadline();
        // Both 1.0 and 3.0 score zero.
        let (idx, params, score) =
            argmin_on_grid(&grid, &deadline, |p| Some((p[0] - 1.0).abs() * (p[0] - 3.0).abs()))
                .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(params, vec![1.0]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn argmin_fails_when_nothing_scores() {
        let grid = vec![vec![0.0]];
        let deadline = FitContext::default().deadline();
        assert_eq!(
            argmin_on_grid(&grid, &deadline, |_| None),
            Err(ModelFitError::NonFinite)
        );
    }
}
