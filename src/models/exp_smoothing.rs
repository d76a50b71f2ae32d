//! Exponential smoothing.
//!
//! - With at least two weekly cycles of data: Holt-Winters with additive trend
//!   and additive weekly seasonality (period 7).
//! - Otherwise: simple exponential smoothing (level only).
//!
//! Smoothing parameters are chosen by grid search on the one-step-ahead SSE.

use crate::domain::{DailySeries, ForecastPoint};
use crate::error::ModelFitError;
use crate::fit::param_grid::{argmin_on_grid, grid_3d, linspace};
use crate::models::{FitContext, FitDeadline, with_linear_bands};

const SEASON: usize = 7;
const PARAM_MIN: f64 = 0.05;
const PARAM_MAX: f64 = 0.95;
const BAND_WIDTH: f64 = 0.15;
const CONFIDENCE_DECAY: f64 = 0.4;
const CONFIDENCE_FLOOR: f64 = 0.4;

pub fn forecast(
    series: &DailySeries,
    horizon: usize,
    ctx: &FitContext,
    deadline: &FitDeadline,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    let values = series.values();
    let raw = if values.len() >= 2 * SEASON {
        let fit = HoltWinters::fit(values, ctx.smoothing_grid_steps, deadline)?;
        fit.predict(values.len(), horizon)
    } else {
        let fit = SimpleSmoothing::fit(values, ctx.smoothing_grid_steps, deadline)?;
        vec![fit.level; horizon]
    };
    with_linear_bands(series, &raw, BAND_WIDTH, CONFIDENCE_DECAY, CONFIDENCE_FLOOR)
}

/// Fitted simple exponential smoothing state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSmoothing {
    pub alpha: f64,
    pub level: f64,
}

impl SimpleSmoothing {
    pub fn fit(values: &[f64], steps: usize, deadline: &FitDeadline) -> Result<Self, ModelFitError> {
        if values.len() < 2 {
            return Err(ModelFitError::InsufficientData {
                required: 2,
                actual: values.len(),
            });
        }
        let grid: Vec<Vec<f64>> = linspace(PARAM_MIN, PARAM_MAX, steps)
            .into_iter()
            .map(|a| vec![a])
            .collect();
        let (_, params, _) = argmin_on_grid(&grid, deadline, |p| Some(ses_run(values, p[0]).1))?;
        let alpha = params[0];
        let (level, _) = ses_run(values, alpha);
        Ok(Self { alpha, level })
    }
}

/// Returns `(final level, one-step SSE)`.
fn ses_run(values: &[f64], alpha: f64) -> (f64, f64) {
    let mut level = values[0];
    let mut sse = 0.0;
    for &y in &values[1..] {
        let err = y - level;
        sse += err * err;
        level += alpha * err;
    }
    (level, sse)
}

/// Fitted additive Holt-Winters state.
#[derive(Debug, Clone, PartialEq)]
pub struct HoltWinters {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub level: f64,
    pub trend: f64,
    /// Seasonal offsets indexed by `day % period`.
    pub seasonal: Vec<f64>,
}

impl HoltWinters {
    pub fn fit(values: &[f64], steps: usize, deadline: &FitDeadline) -> Result<Self, ModelFitError> {
        if values.len() < 2 * SEASON {
            return Err(ModelFitError::InsufficientData {
                required: 2 * SEASON,
                actual: values.len(),
            });
        }
        let axis = linspace(PARAM_MIN, PARAM_MAX, steps);
        let grid = grid_3d(&axis, &axis, &axis);
        let (_, p, _) = argmin_on_grid(&grid, deadline, |p| {
            Some(hw_run(values, p[0], p[1], p[2]).sse)
        })?;
        let state = hw_run(values, p[0], p[1], p[2]);
        Ok(Self {
            alpha: p[0],
            beta: p[1],
            gamma: p[2],
            level: state.level,
            trend: state.trend,
            seasonal: state.seasonal,
        })
    }

    /// Forecast `horizon` steps past a series of length `n`.
    pub fn predict(&self, n: usize, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|h| {
                let season = self.seasonal[(n + h - 1) % SEASON];
                self.level + h as f64 * self.trend + season
            })
            .collect()
    }
}

struct HwState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    sse: f64,
}

fn hw_run(values: &[f64], alpha: f64, beta: f64, gamma: f64) -> HwState {
    let first: f64 = values[..SEASON].iter().sum::<f64>() / SEASON as f64;
    let second: f64 = values[SEASON..2 * SEASON].iter().sum::<f64>() / SEASON as f64;

    let mut level = first;
    let mut trend = (second - first) / SEASON as f64;
    let mut seasonal: Vec<f64> = values[..SEASON].iter().map(|v| v - first).collect();
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate().skip(SEASON) {
        let idx = t % SEASON;
        let prev_level = level;
        let prev_season = seasonal[idx];

        let err = y - (level + trend + prev_season);
        sse += err * err;

        level = alpha * (y - prev_season) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonal[idx] = gamma * (y - level) + (1.0 - gamma) * prev_season;
    }

    HwState {
        level,
        trend,
        seasonal,
        sse,
    }
}
