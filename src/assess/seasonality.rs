//! Seasonality detection by additive decomposition.
//!
//! For each candidate period we split the series into
//! `trend + seasonal + residual` and report
//!
//! ```text
//! strength = min(1, std(seasonal) / (std(series) + ε))
//! ```
//!
//! The trend is a centered moving average (a `2×m` average for even periods),
//! with both edges extrapolated linearly from the nearest `period` trend values
//! so every day carries a trend estimate.

use thiserror::Error;
use tracing::debug;

use crate::domain::{DailySeries, SeasonalPeriod, Seasonality, SeasonalityPattern};
use crate::math::{linear_fit, std_pop};

const WEEKLY_MIN_POINTS: usize = 14;
const MONTHLY_MIN_POINTS: usize = 60;
const DETECTION_THRESHOLD: f64 = 0.1;
const EPS: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecompositionError {
    #[error("need at least two full cycles ({required} points), have {actual}")]
    TooShort { required: usize, actual: usize },
    #[error("trend extrapolation failed")]
    Extrapolation,
    #[error("decomposition produced non-finite values")]
    NonFinite,
}

/// Additive components of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

/// Weekly and monthly seasonality for a daily series.
pub fn analyze_seasonality(series: &DailySeries) -> Seasonality {
    let n = series.len();
    let weekly = if n >= WEEKLY_MIN_POINTS {
        pattern_for(series.values(), SeasonalPeriod::Weekly)
    } else {
        SeasonalityPattern::undetected(SeasonalPeriod::Weekly)
    };
    let monthly = if n >= MONTHLY_MIN_POINTS {
        pattern_for(series.values(), SeasonalPeriod::Monthly)
    } else {
        SeasonalityPattern::undetected(SeasonalPeriod::Monthly)
    };
    Seasonality { weekly, monthly }
}

fn pattern_for(values: &[f64], period: SeasonalPeriod) -> SeasonalityPattern {
    match seasonal_strength(values, period.days()) {
        Ok(strength) => SeasonalityPattern {
            period,
            strength,
            detected: strength > DETECTION_THRESHOLD,
        },
        Err(e) => {
            debug!(period = ?period, error = %e, "seasonal decomposition failed");
            SeasonalityPattern::undetected(period)
        }
    }
}

/// Strength of the seasonal component for `period`, in `[0, 1]`.
pub fn seasonal_strength(values: &[f64], period: usize) -> Result<f64, DecompositionError> {
    let d = decompose_additive(values, period)?;
    let strength = (std_pop(&d.seasonal) / (std_pop(values) + EPS)).min(1.0);
    if !strength.is_finite() {
        return Err(DecompositionError::NonFinite);
    }
    Ok(strength.max(0.0))
}

/// Additive decomposition with linearly extrapolated trend edges.
pub fn decompose_additive(values: &[f64], period: usize) -> Result<Decomposition, DecompositionError> {
    let n = values.len();
    if period < 2 || n < 2 * period {
        return Err(DecompositionError::TooShort {
            required: 2 * period.max(2),
            actual: n,
        });
    }

    let filter = centered_filter(period);
    let half = filter.len() / 2;

    let mut trend = vec![f64::NAN; n];
    for i in half..(n - half) {
        let window = &values[i - half..=i + half];
        trend[i] = window.iter().zip(&filter).map(|(v, w)| v * w).sum();
    }
    extrapolate_edges(&mut trend, half, period)?;

    let detrended: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();

    let mut averages = vec![0.0; period];
    for (pos, avg) in averages.iter_mut().enumerate() {
        let cycle: Vec<f64> = detrended.iter().skip(pos).step_by(period).copied().collect();
        *avg = cycle.iter().sum::<f64>() / cycle.len() as f64;
    }
    let center = averages.iter().sum::<f64>() / period as f64;
    for avg in &mut averages {
        *avg -= center;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| averages[i % period]).collect();
    let residual: Vec<f64> = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((v, t), s)| v - t - s)
        .collect();

    if trend.iter().chain(&seasonal).any(|v| !v.is_finite()) {
        return Err(DecompositionError::NonFinite);
    }

    Ok(Decomposition {
        trend,
        seasonal,
        residual,
    })
}

/// Moving-average weights; even periods use the `2×m` form with half weights at the ends.
fn centered_filter(period: usize) -> Vec<f64> {
    let p = period as f64;
    if period % 2 == 0 {
        let mut w = vec![1.0 / p; period + 1];
        w[0] = 0.5 / p;
        w[period] = 0.5 / p;
        w
    } else {
        vec![1.0 / p; period]
    }
}

/// Fill the `half` missing values at each end by a line through the nearest
/// `period` trend values.
fn extrapolate_edges(trend: &mut [f64], half: usize, period: usize) -> Result<(), DecompositionError> {
    if half == 0 {
        return Ok(());
    }
    let n = trend.len();
    let last_valid = n - half - 1;
    let span = period.min(last_valid + 1 - half).max(2);

    let front = &trend[half..half + span];
    let (a, b) = linear_fit(front).ok_or(DecompositionError::Extrapolation)?;
    for i in 0..half {
        // Index relative to `half`.
        trend[i] = a + b * (i as f64 - half as f64);
    }

    let back_start = last_valid + 1 - span;
    let back = &trend[back_start..=last_valid];
    let (a, b) = linear_fit(back).ok_or(DecompositionError::Extrapolation)?;
    for i in (last_valid + 1)..n {
        trend[i] = a + b * (i - back_start) as f64;
    }
    Ok(())
}
