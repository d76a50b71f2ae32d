//! Baseline: flat forecast at the mean of the last week.
//!
//! This is the terminal step of every fallback chain, so it cannot fail on a
//! non-empty series.

use crate::domain::{DailySeries, ForecastPoint};
use crate::math::mean;
use crate::models::forecast_dates;

const WINDOW: usize = 7;
const BAND_WIDTH: f64 = 0.2;
const CONFIDENCE_DECAY: f64 = 0.5;
const CONFIDENCE_FLOOR: f64 = 0.3;

pub fn forecast(series: &DailySeries, horizon: usize) -> Vec<ForecastPoint> {
    let value = mean(series.tail(WINDOW));
    let value = if value.is_finite() { value } else { 0.0 };
    let h = horizon.max(1) as f64;

    forecast_dates(series, horizon)
        .enumerate()
        .map(|(i, date)| {
            let frac = i as f64 / h;
            let uncertainty = value * BAND_WIDTH * frac;
            let confidence = (1.0 - CONFIDENCE_DECAY * frac).max(CONFIDENCE_FLOOR);
            ForecastPoint::from_value(date, value, uncertainty, confidence)
        })
        .collect()
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
    fn flat_at_last_week_mean() {
        let mut values = vec![100.0; 10];
        values.extend([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let points = forecast(&series(values), 10);
        assert_eq!(points.len(), 10);
        for p in &points {
            assert!((p.predicted_quantity - 4.0).abs() < 1e-12);
        }
        assert_eq!(points[0].lower_bound, 4.0);
        assert!((points[5].upper_bound - (4.0 + 4.0 * 0.2 * 0.5)).abs() < 1e-12);
        assert!((points[5].confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn short_series_uses_all_points_and_confidence_floor_holds() {
        let points = forecast(&series(vec![2.0, 4.0]), 4);
        assert!((points[0].predicted_quantity - 3.0).abs() < 1e-12);
        for p in &points {
            assert!(p.confidence >= 0.3);
        }
    }
}
