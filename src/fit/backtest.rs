//! Holdout backtesting.
//!
//! The last `holdout` days are held out; every candidate is refit (through its
//! fallback chain) on the remaining prefix and scored against the held-out
//! actuals:
//!
//! ```text
//! MAE   = mean |a − p|
//! RMSE  = sqrt(mean (a − p)²)
//! MAPE  = mean(|a − p| / (a + 1)) × 100
//! score = 1 / (1 + MAE / (mean(a) + 1))
//! ```

use rayon::prelude::*;

use crate::domain::{DailySeries, ModelKind, ModelPerformance};
use crate::fit::fallback::run_chain;
use crate::math::{mae, mape_plus_one, mean, rmse};
use crate::models::FitContext;

/// Split `series` into `(train, test)` with `holdout` test days.
///
/// Returns `None` if there would be no training data left.
pub fn holdout_split(series: &DailySeries, holdout: usize) -> Option<(DailySeries, &[f64])> {
    if holdout == 0 || series.len() <= holdout {
        return None;
    }
    let train = series.head(series.len() - holdout);
    Some((train, series.tail(holdout)))
}

/// Backtest every candidate. Fits run in parallel; the output keeps the
/// order of `candidates`.
pub fn backtest_candidates(
    series: &DailySeries,
    candidates: &[ModelKind],
    holdout: usize,
    ctx: &FitContext,
) -> Vec<ModelPerformance> {
    let Some((train, actual)) = holdout_split(series, holdout) else {
        return Vec::new();
    };

    candidates
        .par_iter()
        .map(|&kind| {
            let outcome = run_chain(kind, &train, actual.len(), ctx);
            let predicted: Vec<f64> = outcome.points.iter().map(|p| p.predicted_quantity).collect();
            score(kind, outcome.executed, actual, &predicted)
        })
        .collect()
}

/// Score one backtest forecast against the held-out actuals.
pub fn score(
    model_name: ModelKind,
    executed_model: ModelKind,
    actual: &[f64],
    predicted: &[f64],
) -> ModelPerformance {
    let mae = mae(actual, predicted);
    ModelPerformance {
        model_name,
        executed_model,
        mae,
        rmse: rmse(actual, predicted),
        mape: mape_plus_one(actual, predicted),
        confidence_score: 1.0 / (1.0 + mae / (mean(actual) + 1.0)),
    }
}
