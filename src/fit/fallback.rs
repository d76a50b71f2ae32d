//! Fallback chains.
//!
//! A requested model runs through an ordered list of strategies; the first one
//! that fits wins:
//!
//! ```text
//! prophet → arima → exponential_smoothing → moving_average
//! ```
//!
//! Requesting a model enters the chain at that model. Moving average is the
//! terminal step and cannot fail on a non-empty series.

use tracing::debug;

use crate::domain::{DailySeries, ForecastPoint, ModelKind};
use crate::error::ModelFitError;
use crate::models::{FitContext, fit_model, moving_average};

const CHAIN: [ModelKind; 4] = [
    ModelKind::Prophet,
    ModelKind::Arima,
    ModelKind::ExponentialSmoothing,
    ModelKind::MovingAverage,
];

/// The strategies tried for `requested`, in order.
pub fn chain_for(requested: ModelKind) -> &'static [ModelKind] {
    let start = CHAIN.iter().position(|k| *k == requested).unwrap_or(CHAIN.len() - 1);
    &CHAIN[start..]
}

/// Result of running one fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub requested: ModelKind,
    /// The model that actually produced `points`.
    pub executed: ModelKind,
    pub points: Vec<ForecastPoint>,
    /// Steps that failed before `executed`, in order.
    pub failures: Vec<(ModelKind, ModelFitError)>,
}

impl ChainOutcome {
    pub fn fell_back(&self) -> bool {
        self.requested != self.executed
    }
}

/// Run `requested` and fall back along its chain until a model fits.
pub fn run_chain(
    requested: ModelKind,
    series: &DailySeries,
    horizon: usize,
    ctx: &FitContext,
) -> ChainOutcome {
    let mut failures = Vec::new();
    for &kind in chain_for(requested) {
        if kind == ModelKind::MovingAverage {
            break;
        }
        match fit_model(kind, series, horizon, ctx) {
            Ok(points) => {
                return ChainOutcome {
                    requested,
                    executed: kind,
                    points,
                    failures,
                };
            }
            Err(e) => {
                debug!(
                    model = kind.as_str(),
                    requested = requested.as_str(),
                    error = %e,
                    "model fit failed, falling back"
                );
                failures.push((kind, e));
            }
        }
    }

    ChainOutcome {
        requested,
        executed: ModelKind::MovingAverage,
        points: moving_average::forecast(series, horizon),
        failures,
    }
}
