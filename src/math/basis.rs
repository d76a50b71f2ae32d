//! Regression basis functions for additive trend + seasonality models.
//!
//! - `fourier_pair(t, period, k)` gives the `k`-th harmonic `(sin, cos)` pair
//!   at time `t` (days) for a cycle of `period` days.
//! - `hinge(t, c)` is the piecewise-linear changepoint basis `max(0, t - c)`.
//!
//! Both are evaluated on a day index so that training and forecast rows share
//! the same design.

use std::f64::consts::PI;

/// The `k`-th Fourier harmonic (1-based) at day `t`.
pub fn fourier_pair(t: f64, period: f64, k: usize) -> (f64, f64) {
    let x = 2.0 * PI * (k as f64) * t / period;
    (x.sin(), x.cos())
}

/// Piecewise-linear hinge at changepoint `c`.
pub fn hinge(t: f64, c: f64) -> f64 {
    (t - c).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourier_pair_repeats_every_period() {
        for k in 1..=3 {
            let (s0, c0) = fourier_pair(2.0, 7.0, k);
            let (s1, c1) = fourier_pair(9.0, 7.0, k);
            assert!((s0 - s1).abs() < 1e-9);
            assert!((c0 - c1).abs() < 1e-9);
        }
    }

    #[test]
    fn hinge_is_zero_before_changepoint() {
        assert_eq!(hinge(3.0, 5.0), 0.0);
        assert_eq!(hinge(8.0, 5.0), 3.0);
    }
}
