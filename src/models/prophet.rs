//! Prophet-style additive regression (optional, `prophet` feature).
//!
//! ```text
//! y(t) = k + m·t + Σ_j δ_j·max(0, t − c_j) + weekly(t) + ε
//! ```
//!
//! - piecewise-linear trend with changepoints `c_j` spread evenly over the first
//!   80% of the history; `δ_j` are ridge-penalized (sparse-ish rate changes)
//! - weekly seasonality as 3 Fourier harmonics, only with at least 14 days
//! - no daily or yearly terms
//!
//! The interval is an 80% band from the in-sample residual spread, widened with
//! the distance past the end of the history. Every point carries confidence 0.7.

use crate::domain::{DailySeries, ForecastPoint};
use crate::error::ModelFitError;
use crate::models::FitDeadline;

#[cfg(feature = "prophet")]
pub fn forecast(
    series: &DailySeries,
    horizon: usize,
    deadline: &FitDeadline,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    imp::forecast(series, horizon, deadline)
}

#[cfg(not(feature = "prophet"))]
pub fn forecast(
    _series: &DailySeries,
    _horizon: usize,
    _deadline: &FitDeadline,
) -> Result<Vec<ForecastPoint>, ModelFitError> {
    Err(ModelFitError::Unavailable)
}

#[cfg(feature = "prophet")]
mod imp {
    use nalgebra::{DMatrix, DVector};

    use super::*;
    use crate::math::{fourier_pair, hinge, solve_ridge, std_sample};
    use crate::models::forecast_dates;

    const MIN_POINTS: usize = 2;
    const WEEKLY_MIN_POINTS: usize = 14;
    const WEEKLY_ORDER: usize = 3;
    const MAX_CHANGEPOINTS: usize = 10;
    const CHANGEPOINT_RANGE: f64 = 0.8;
    const CHANGEPOINT_PENALTY: f64 = 10.0;
    /// Two-sided 80% normal quantile.
    const Z_80: f64 = 1.2816;
    const CONFIDENCE: f64 = 0.7;

    struct Design {
        changepoints: Vec<f64>,
        weekly: bool,
        /// Time scale: `t` is measured in units of the history length.
        scale: f64,
    }

    impl Design {
        fn new(n: usize) -> Self {
            let weekly = n >= WEEKLY_MIN_POINTS;
            let k = (n / 7).min(MAX_CHANGEPOINTS);
            let scale = (n.max(2) - 1) as f64;
            let changepoints = (1..=k)
                .map(|j| CHANGEPOINT_RANGE * j as f64 / (k + 1) as f64)
                .collect();
            Self {
                changepoints,
                weekly,
                scale,
            }
        }

        fn width(&self) -> usize {
            2 + self.changepoints.len() + if self.weekly { 2 * WEEKLY_ORDER } else { 0 }
        }

        fn penalized(&self) -> Vec<usize> {
            (2..2 + self.changepoints.len()).collect()
        }

        fn fill_row(&self, day: f64, out: &mut [f64]) {
            let t = day / self.scale;
            out[0] = 1.0;
            out[1] = t;
            let mut col = 2;
            for &c in &self.changepoints {
                out[col] = hinge(t, c);
                col += 1;
            }
            if self.weekly {
                for k in 1..=WEEKLY_ORDER {
                    let (s, c) = fourier_pair(day, 7.0, k);
                    out[col] = s;
                    out[col + 1] = c;
                    col += 2;
                }
            }
        }
    }

    pub(super) fn forecast(
        series: &DailySeries,
        horizon: usize,
        deadline: &FitDeadline,
    ) -> Result<Vec<ForecastPoint>, ModelFitError> {
        let y = series.values();
        let n = y.len();
        if n < MIN_POINTS {
            return Err(ModelFitError::InsufficientData {
                required: MIN_POINTS,
                actual: n,
            });
        }

        let design = Design::new(n);
        let p = design.width();
        let mut x = DMatrix::<f64>::zeros(n, p);
        let mut row = vec![0.0; p];
        for i in 0..n {
            design.fill_row(i as f64, &mut row);
            for (j, v) in row.iter().enumerate() {
                x[(i, j)] = *v;
            }
        }
        deadline.check()?;

        let yv = DVector::from_row_slice(y);
        let beta = solve_ridge(&x, &yv, CHANGEPOINT_PENALTY, &design.penalized())
            .ok_or(ModelFitError::Singular)?;
        deadline.check()?;

        let fitted = &x * &beta;
        let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, f)| a - f).collect();
        let sigma = std_sample(&residuals);
        if !sigma.is_finite() {
            return Err(ModelFitError::NonFinite);
        }

        let mut points = Vec::with_capacity(horizon);
        for (h, date) in forecast_dates(series, horizon).enumerate() {
            let day = (n + h) as f64;
            design.fill_row(day, &mut row);
            let value: f64 = row.iter().zip(beta.iter()).map(|(a, b)| a * b).sum();
            if !value.is_finite() {
                return Err(ModelFitError::NonFinite);
            }
            let half_width = Z_80 * sigma * (1.0 + (h + 1) as f64 / n as f64).sqrt();
            points.push(ForecastPoint::from_interval(
                date,
                value,
                value - half_width,
                value + half_width,
                CONFIDENCE,
            ));
        }
        Ok(points)
    }
}

#[cfg(all(test, feature = "prophet"))]
mod tests {
    use super::*;
    use crate::models::FitContext;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = start + chrono::Duration::days(values.len() as i64 - 1);
        DailySeries::new(start, values, end).unwrap()
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let values: Vec<f64> = (0..60).map(|i| 10.0 + 0.5 * i as f64).collect();
        let deadline = FitContext::default().deadline();
        let points = forecast(&series(values), 10, &deadline).unwrap();
        assert_eq!(points.len(), 10);
        assert!((points[0].predicted_quantity - 40.0).abs() < 1.0);
        assert!(points[9].predicted_quantity > points[0].predicted_quantity);
    }

    #[test]
    fn bounds_are_clipped_and_confidence_is_fixed() {
        let values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.0 } else { 2.0 }).collect();
        let deadline = FitContext::default().deadline();
        for p in forecast(&series(values), 14, &deadline).unwrap() {
            assert!(p.lower_bound >= 0.0);
            assert!(p.lower_bound <= p.predicted_quantity);
            assert!(p.predicted_quantity <= p.upper_bound);
            assert_eq!(p.confidence, 0.7);
        }
    }

    #[test]
    fn single_point_is_insufficient() {
        let deadline = FitContext::default().deadline();
        assert!(matches!(
            forecast(&series(vec![5.0]), 3, &deadline),
            Err(ModelFitError::InsufficientData { .. })
        ));
    }
}
