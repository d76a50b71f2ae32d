//! Descriptive statistics and forecast error metrics.
//!
//! All functions return `0.0` for empty input instead of `NaN`, so callers can
//! combine them without special-casing short series.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std_pop(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Sample standard deviation (ddof = 1). Zero for fewer than two values.
pub fn std_sample(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Geometric mean of strictly positive factors. Zero if any factor is <= 0.
pub fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|&v| v <= 0.0) {
        return 0.0;
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    (log_sum / values.len() as f64).exp()
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n as f64
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64;
    mse.sqrt()
}

/// Percentage error with a `+1` denominator so zero-demand days stay finite.
pub fn mape_plus_one(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / (a + 1.0))
        .sum();
    sum / n as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_pop(&[]), 0.0);
        assert_eq!(std_sample(&[1.0]), 0.0);
        assert_eq!(mae(&[], &[]), 0.0);
    }

    #[test]
    fn std_variants() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_pop(&v) - 2.0).abs() < 1e-12);
        assert!((std_sample(&v) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn geometric_mean_of_factors() {
        assert!((geometric_mean(&[0.5, 2.0]) - 1.0).abs() < 1e-12);
        assert!((geometric_mean(&[0.8]) - 0.8).abs() < 1e-12);
        assert_eq!(geometric_mean(&[0.5, 0.0]), 0.0);
    }

    #[test]
    fn error_metrics() {
        let a = [10.0, 0.0];
        let p = [8.0, 1.0];
        assert!((mae(&a, &p) - 1.5).abs() < 1e-12);
        assert!((rmse(&a, &p) - (2.5f64).sqrt()).abs() < 1e-12);
        // (2/11 + 1/1) / 2 * 100
        assert!((mape_plus_one(&a, &p) - (2.0 / 11.0 + 1.0) / 2.0 * 100.0).abs() < 1e-9);
    }
}
