//! Synthetic daily sales generation.
//!
//! ```text
//! level(t)   = base + trend·t
//! weekly(t)  = 1 + amplitude·sin(2π·t/7)
//! noise(t)   = exp(σ·z − σ²/2),  z ~ N(0, 1)
//! qty(t)     = round(max(0, level·weekly·noise)), or 0 with probability p_zero
//! ```
//!
//! The log-normal noise is mean-corrected so it does not bias the level. The
//! same seed always produces the same history.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SalesObservation;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub days: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Mean daily units on day 0.
    pub base: f64,
    /// Change in mean daily units per day.
    pub trend: f64,
    pub weekly_amplitude: f64,
    /// Log-scale noise σ.
    pub noise: f64,
    pub zero_prob: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            days: 90,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
            base: 20.0,
            trend: 0.1,
            weekly_amplitude: 0.3,
            noise: 0.15,
            zero_prob: 0.0,
        }
    }
}

impl SampleConfig {
    fn validate(&self) -> Result<(), AppError> {
        if self.days == 0 {
            return Err(AppError::new(2, "Sample days must be > 0."));
        }
        if !(self.base.is_finite() && self.base >= 0.0) {
            return Err(AppError::new(2, "Sample base must be finite and >= 0."));
        }
        if !self.trend.is_finite() {
            return Err(AppError::new(2, "Sample trend must be finite."));
        }
        if !(self.weekly_amplitude.is_finite() && (0.0..=1.0).contains(&self.weekly_amplitude)) {
            return Err(AppError::new(2, "Weekly amplitude must be within [0, 1]."));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(AppError::new(2, "Sample noise must be finite and >= 0."));
        }
        if !(0.0..1.0).contains(&self.zero_prob) {
            return Err(AppError::new(2, "Zero probability must be within [0, 1)."));
        }
        Ok(())
    }
}

pub fn generate_sales(config: &SampleConfig) -> Result<Vec<SalesObservation>, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;
    let sigma = config.noise;

    let mut history = Vec::with_capacity(config.days);
    for t in 0..config.days {
        let date = config.start + Duration::days(t as i64);
        let level = config.base + config.trend * t as f64;
        let phase = 2.0 * std::f64::consts::PI * t as f64 / 7.0;
        let weekly = 1.0 + config.weekly_amplitude * phase.sin();
        let z = normal.sample(&mut rng);
        let noise = (sigma * z - 0.5 * sigma * sigma).exp();

        let roll: f64 = rng.r#gen();
        let quantity = if roll < config.zero_prob {
            0.0
        } else {
            (level * weekly * noise).max(0.0).round()
        };
        history.push(SalesObservation { date, quantity });
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_history() {
        let cfg = SampleConfig::default();
        let a = generate_sales(&cfg).unwrap();
        let b = generate_sales(&cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 90);
        assert_eq!(a[89].date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert!(a.iter().all(|o| o.quantity >= 0.0 && o.quantity.fract() == 0.0));
    }

    #[test]
    fn noiseless_sample_follows_trend_and_weekly_shape() {
        let cfg = SampleConfig {
            days: 14,
            noise: 0.0,
            trend: 0.0,
            base: 100.0,
            weekly_amplitude: 0.5,
            ..SampleConfig::default()
        };
        let h = generate_sales(&cfg).unwrap();
        assert_eq!(h[0].quantity, 100.0);
        assert_eq!(h[7].quantity, 100.0);
        // sin(2π·2/7) ≈ 0.975
        assert_eq!(h[2].quantity, 149.0);
    }

    #[test]
    fn zero_probability_produces_zeros() {
        let cfg = SampleConfig {
            days: 200,
            zero_prob: 0.5,
            ..SampleConfig::default()
        };
        let zeros = generate_sales(&cfg)
            .unwrap()
            .iter()
            .filter(|o| o.quantity == 0.0)
            .count();
        assert!(zeros > 60 && zeros < 140, "zeros={zeros}");
    }

    #[test]
    fn invalid_settings_are_usage_errors() {
        let cfg = SampleConfig {
            days: 0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_sales(&cfg).unwrap_err().exit_code(), 2);
    }
}
