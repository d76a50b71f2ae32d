//! Engine configuration.
//!
//! Defaults reproduce the documented forecasting policy. Individual knobs can be
//! overridden from the environment (`DEMAND_*`, optionally via a `.env` file) and
//! from CLI flags.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_HORIZON_DAYS: usize = 30;

/// Tunables for one `ForecastEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Horizon used when the caller does not pass one.
    pub default_horizon_days: usize,
    /// Days held out for the backtest.
    pub holdout_days: usize,
    /// Below this many days the backtest is skipped.
    pub min_backtest_points: usize,
    /// Cooperative per-model fit deadline.
    pub fit_timeout_ms: u64,
    /// Multiplier on expected 30-day demand when sizing a reorder.
    pub safety_stock_factor: f64,
    /// `final_confidence` below this raises a `low_confidence` alert.
    pub low_confidence_threshold: f64,
    pub critical_stock_days: f64,
    pub high_stock_days: f64,
    pub reorder_stock_days: f64,
    pub overstock_days: f64,
    /// Grid resolution (per parameter) for Holt-Winters smoothing search.
    pub smoothing_grid_steps: usize,
    /// Grid resolution (per parameter) for the ARIMA `(phi, theta)` search.
    pub arima_grid_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: DEFAULT_HORIZON_DAYS,
            holdout_days: 7,
            min_backtest_points: 14,
            fit_timeout_ms: 2_000,
            safety_stock_factor: 1.2,
            low_confidence_threshold: 0.6,
            critical_stock_days: 3.0,
            high_stock_days: 7.0,
            reorder_stock_days: 14.0,
            overstock_days: 90.0,
            smoothing_grid_steps: 9,
            arima_grid_steps: 19,
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by any `DEMAND_*` variables in the environment or `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (env-style names).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "DEMAND_DEFAULT_HORIZON_DAYS")? {
            self.default_horizon_days = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_HOLDOUT_DAYS")? {
            self.holdout_days = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_MIN_BACKTEST_POINTS")? {
            self.min_backtest_points = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_FIT_TIMEOUT_MS")? {
            self.fit_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_SAFETY_STOCK_FACTOR")? {
            self.safety_stock_factor = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_LOW_CONFIDENCE_THRESHOLD")? {
            self.low_confidence_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_SMOOTHING_GRID_STEPS")? {
            self.smoothing_grid_steps = v;
        }
        if let Some(v) = parse_var(&lookup, "DEMAND_ARIMA_GRID_STEPS")? {
            self.arima_grid_steps = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.default_horizon_days == 0 {
            return Err(AppError::new(2, "default_horizon_days must be > 0."));
        }
        if self.holdout_days == 0 {
            return Err(AppError::new(2, "holdout_days must be > 0."));
        }
        if self.min_backtest_points <= self.holdout_days {
            return Err(AppError::new(
                2,
                "min_backtest_points must exceed holdout_days.",
            ));
        }
        if !(self.safety_stock_factor.is_finite() && self.safety_stock_factor >= 1.0) {
            return Err(AppError::new(2, "safety_stock_factor must be >= 1.0."));
        }
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(AppError::new(
                2,
                "low_confidence_threshold must be within [0, 1].",
            ));
        }
        if self.smoothing_grid_steps < 2 || self.arima_grid_steps < 2 {
            return Err(AppError::new(2, "Grid steps must be >= 2."));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::new(2, format!("Invalid value for {key}: '{raw}'"))),
    }
}

/// Optional model capabilities, resolved once and injected into the model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub prophet: bool,
}

impl ModelCapabilities {
    /// Capabilities compiled into this build.
    pub fn detect() -> Self {
        Self {
            prophet: cfg!(feature = "prophet"),
        }
    }

    /// Only the always-available core models.
    pub fn core_only() -> Self {
        Self { prophet: false }
    }
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}
