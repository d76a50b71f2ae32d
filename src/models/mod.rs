//! Candidate demand forecasters.
//!
//! Each model is a small, pure function of `(series, horizon)` that returns one
//! `ForecastPoint` per future day, starting the day after the series ends.
//! Models may fail (`ModelFitError`); recovery is the job of
//! `fit::fallback`, not of the models themselves.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::domain::{DailySeries, EngineConfig, ForecastPoint, ModelCapabilities, ModelKind};
use crate::error::ModelFitError;

pub mod arima;
pub mod exp_smoothing;
pub mod moving_average;
pub mod prophet;

/// Shared fitting knobs, derived once per engine from config + capabilities.
#[derive(Debug, Clone)]
pub struct FitContext {
    pub smoothing_grid_steps: usize,
    pub arima_grid_steps: usize,
    pub timeout: Duration,
    pub capabilities: ModelCapabilities,
}

impl FitContext {
    pub fn new(config: &EngineConfig, capabilities: ModelCapabilities) -> Self {
        Self {
            smoothing_grid_steps: config.smoothing_grid_steps,
            arima_grid_steps: config.arima_grid_steps,
            timeout: Duration::from_millis(config.fit_timeout_ms),
            capabilities,
        }
    }

    /// Start the clock for one model fit.
    pub fn deadline(&self) -> FitDeadline {
        FitDeadline {
            started: Instant::now(),
            budget: self.timeout,
        }
    }
}

impl Default for FitContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), ModelCapabilities::detect())
    }
}

/// Cooperative fit deadline, polled by iterative fits.
///
/// The deadline is wall-clock time, so identical inputs give identical output
/// only when no fit hits it.
#[derive(Debug, Clone, Copy)]
pub struct FitDeadline {
    started: Instant,
    budget: Duration,
}

impl FitDeadline {
    pub fn check(&self) -> Result<(), ModelFitError> {
        if self.started.elapsed() > self.budget {
            return Err(ModelFitError::Timeout(self.budget.as_millis() as u64));
        }
        Ok(())
    }
}

/// Fit a single model kind (no fallback).
pub fn fit_model(
    kind: ModelKind,
    series: &DailySeries,
    horizon: usize,
    ctx: &FitContext,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    let deadline = ctx.deadline();
    let points = match kind {
        ModelKind::MovingAverage => moving_average::forecast(series, horizon),
        ModelKind::ExponentialSmoothing => exp_smoothing::forecast(series, horizon, ctx, &deadline)?,
        ModelKind::Arima => arima::forecast(series, horizon, ctx, &deadline)?,
        ModelKind::Prophet => {
            if !ctx.capabilities.prophet {
                return Err(ModelFitError::Unavailable);
            }
            prophet::forecast(series, horizon, &deadline)?
        }
    };
    debug_assert_eq!(points.len(), horizon);
    Ok(points)
}

/// Dates for a horizon following the series' last day.
pub fn forecast_dates(series: &DailySeries, horizon: usize) -> impl Iterator<Item = NaiveDate> {
    let end = series.end();
    (1..=horizon).map(move |i| end + chrono::Duration::days(i as i64))
}

/// Attach linearly widening bounds and decaying confidence to raw model values.
///
/// For day `i` (0-based) of `h`:
/// `uncertainty = |value| × width × i/h`, `confidence = max(floor, 1 − decay × i/h)`.
pub(crate) fn with_linear_bands(
    series: &DailySeries,
    values: &[f64],
    width: f64,
    decay: f64,
    floor: f64,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ModelFitError::NonFinite);
    }
    let h = values.len().max(1) as f64;
    Ok(forecast_dates(series, values.len())
        .zip(values)
        .enumerate()
        .map(|(i, (date, &value))| {
            let frac = i as f64 / h;
            let uncertainty = value.abs() * width * frac;
            let confidence = (1.0 - decay * frac).max(floor);
            ForecastPoint::from_value(date, value, uncertainty, confidence)
        })
        .collect())
}
