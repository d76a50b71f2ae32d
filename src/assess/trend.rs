//! Overall trend direction.
//!
//! A least-squares line is fitted to the most recent (up to 30) days; the slope
//! counts as a trend only when it exceeds 1% of the series mean per day.

use crate::domain::{DailySeries, TrendDirection};
use crate::math::{linear_fit, mean};

const MIN_POINTS: usize = 7;
const WINDOW: usize = 30;
const RELATIVE_THRESHOLD: f64 = 0.01;
const SLOPE_EPS: f64 = 1e-9;

pub fn analyze_trend(series: &DailySeries) -> TrendDirection {
    if series.len() < MIN_POINTS {
        return TrendDirection::Stable;
    }
    let recent = series.tail(WINDOW.min(series.len()));
    let Some((_, slope)) = linear_fit(recent) else {
        return TrendDirection::Stable;
    };

    let threshold = RELATIVE_THRESHOLD * mean(series.values());
    if slope.abs() < threshold.abs().max(SLOPE_EPS) {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
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
    fn short_series_is_stable() {
        let s = series(vec![1.0, 5.0, 10.0, 20.0, 40.0, 80.0]);
        assert_eq!(analyze_trend(&s), TrendDirection::Stable);
    }

    #[test]
    fn detects_direction() {
        let up = series((0..40).map(|i| 10.0 + i as f64).collect());
        assert_eq!(analyze_trend(&up), TrendDirection::Increasing);

        let down = series((0..40).map(|i| 100.0 - 2.0 * i as f64).collect());
        assert_eq!(analyze_trend(&down), TrendDirection::Decreasing);
    }

    #[test]
    fn small_slope_relative_to_mean_is_stable() {
        // slope 0.05/day vs 1% of ~100 = 1.0
        let s = series((0..60).map(|i| 100.0 + 0.05 * i as f64).collect());
        assert_eq!(analyze_trend(&s), TrendDirection::Stable);
    }

    #[test]
    fn flat_zero_series_is_stable() {
        let s = series(vec![0.0; 30]);
        assert_eq!(analyze_trend(&s), TrendDirection::Stable);
    }
}
