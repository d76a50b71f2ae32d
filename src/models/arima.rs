//! ARIMA(1,1,1) with a fixed order.
//!
//! On the first difference `w_t = y_t − y_{t−1}` we fit
//!
//! ```text
//! w_t = φ·w_{t−1} + e_t + θ·e_{t−1}
//! ```
//!
//! by conditional sum of squares (CSS, `e_0 = 0`). `(φ, θ)` come from a coarse
//! grid over the stationary/invertible region followed by one refinement pass
//! around the coarse optimum. Forecasts are integrated back onto the level scale.

use crate::domain::{DailySeries, ForecastPoint};
use crate::error::ModelFitError;
use crate::fit::param_grid::{argmin_on_grid, grid_2d, linspace, refine_axis};
use crate::models::{FitContext, FitDeadline, with_linear_bands};

/// Below this many observations the CSS estimate is not meaningful.
pub const MIN_POINTS: usize = 10;
const COEF_BOUND: f64 = 0.95;
const BAND_WIDTH: f64 = 0.2;
const CONFIDENCE_DECAY: f64 = 0.3;
const CONFIDENCE_FLOOR: f64 = 0.5;

pub fn forecast(
    series: &DailySeries,
    horizon: usize,
    ctx: &FitContext,
    deadline: &FitDeadline,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    let fit = Arima111::fit(series.values(), ctx.arima_grid_steps, deadline)?;
    let raw = fit.predict(horizon);
    with_linear_bands(series, &raw, BAND_WIDTH, CONFIDENCE_DECAY, CONFIDENCE_FLOOR)
}

/// Fitted ARIMA(1,1,1) state needed for forecasting.
#[derive(Debug, Clone, PartialEq)]
pub struct Arima111 {
    pub phi: f64,
    pub theta: f64,
    pub sigma2: f64,
    last_level: f64,
    last_diff: f64,
    last_resid: f64,
}

impl Arima111 {
    pub fn fit(values: &[f64], steps: usize, deadline: &FitDeadline) -> Result<Self, ModelFitError> {
        if values.len() < MIN_POINTS {
            return Err(ModelFitError::InsufficientData {
                required: MIN_POINTS,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelFitError::NonFinite);
        }

        let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

        let axis = linspace(-COEF_BOUND, COEF_BOUND, steps);
        let coarse = grid_2d(&axis, &axis);
        let (_, p, _) = argmin_on_grid(&coarse, deadline, |p| Some(css(&diffs, p[0], p[1]).0))?;

        let radius = 2.0 * COEF_BOUND / (steps.max(2) as f64 - 1.0);
        let phi_axis = refine_axis(p[0], radius, steps, -COEF_BOUND, COEF_BOUND);
        let theta_axis = refine_axis(p[1], radius, steps, -COEF_BOUND, COEF_BOUND);
        let fine = grid_2d(&phi_axis, &theta_axis);
        let (_, p, sse) = argmin_on_grid(&fine, deadline, |p| Some(css(&diffs, p[0], p[1]).0))?;

        let (phi, theta) = (p[0], p[1]);
        let (_, last_resid) = css(&diffs, phi, theta);
        let sigma2 = sse / diffs.len().saturating_sub(1).max(1) as f64;
        if !(sigma2.is_finite() && last_resid.is_finite()) {
            return Err(ModelFitError::NonFinite);
        }

        Ok(Self {
            phi,
            theta,
            sigma2,
            last_level: values[values.len() - 1],
            last_diff: diffs[diffs.len() - 1],
            last_resid,
        })
    }

    /// Level forecasts for `horizon` days.
    pub fn predict(&self, horizon: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(horizon);
        let mut level = self.last_level;
        let mut diff = self.last_diff;
        for h in 0..horizon {
            diff = if h == 0 {
                self.phi * diff + self.theta * self.last_resid
            } else {
                self.phi * diff
            };
            level += diff;
            out.push(level);
        }
        out
    }
}

/// Conditional sum of squares and the final residual.
fn css(diffs: &[f64], phi: f64, theta: f64) -> (f64, f64) {
    let mut prev_resid = 0.0;
    let mut sse = 0.0;
    for t in 1..diffs.len() {
        let pred = phi * diffs[t - 1] + theta * prev_resid;
        let e = diffs[t] - pred;
        sse += e * e;
        prev_resid = e;
    }
    (sse, prev_resid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = start + chrono::Duration::days(values.len() as i64 - 1);
        DailySeries::new(start, values, end).unwrap()
    }

    #[test]
    fn too_short_is_insufficient() {
        let ctx = FitContext::default();
        let err = forecast(&series(vec![1.0; 9]), 5, &ctx, &ctx.deadline()).unwrap_err();
        assert_eq!(
            err,
            ModelFitError::InsufficientData {
                required: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn constant_series_stays_flat() {
        let ctx = FitContext::default();
        let points = forecast(&series(vec![10.0; 40]), 14, &ctx, &ctx.deadline()).unwrap();
        assert_eq!(points.len(), 14);
        for p in &points {
            assert!((p.predicted_quantity - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn recovers_positive_ar_coefficient() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        use rand_distr::{Distribution, Normal};

        // Differences follow w_t = 0.6 w_{t-1} + N(0, 1) shocks.
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut w = vec![1.0];
        for t in 1..200 {
            w.push(0.6 * w[t - 1] + normal.sample(&mut rng));
        }
        let mut y = vec![50.0];
        for d in &w {
            y.push(y[y.len() - 1] + d);
        }
        let ctx = FitContext::default();
        let fit = Arima111::fit(&y, ctx.arima_grid_steps, &ctx.deadline()).unwrap();
        assert!(fit.phi > 0.2, "phi={}", fit.phi);
        assert_eq!(fit.predict(5).len(), 5);
    }

    #[test]
    fn confidence_follows_documented_decay() {
        let ctx = FitContext::default();
        let values: Vec<f64> = (0..30).map(|i| 20.0 + (i % 4) as f64).collect();
        let points = forecast(&series(values), 10, &ctx, &ctx.deadline()).unwrap();
        assert!((points[0].confidence - 1.0).abs() < 1e-12);
        assert!((points[5].confidence - 0.85).abs() < 1e-12);
    }
}
