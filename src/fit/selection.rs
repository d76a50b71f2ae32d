//! Model selection.
//!
//! Rules:
//! 1. With fewer than `min_backtest_points` days there is nothing to validate on:
//!    exponential smoothing (through its fallback chain) forecasts the full
//!    series and no performances are reported.
//! 2. Otherwise every available candidate is backtested on the held-out week
//!    and the highest `confidence_score` wins. Ties go to the earlier model in
//!    `ModelKind::ALL` order.
//! 3. The winner is refit on the full series. `best_model` is whatever model
//!    actually ran after fallback.

use tracing::debug;

use crate::domain::{DailySeries, EngineConfig, ForecastPoint, ModelCapabilities, ModelKind, ModelPerformance};
use crate::fit::backtest::backtest_candidates;
use crate::fit::fallback::run_chain;
use crate::models::FitContext;

/// Output of backtesting + selection + the final refit.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    /// The model that produced `points`.
    pub best_model: ModelKind,
    /// The backtest winner, if backtesting ran.
    pub winner: Option<ModelPerformance>,
    pub performances: Vec<ModelPerformance>,
    pub points: Vec<ForecastPoint>,
    pub candidates: Vec<ModelKind>,
}

impl ModelSelection {
    pub fn backtested(&self) -> bool {
        !self.performances.is_empty()
    }
}

/// Candidates available in this build, in declared order.
pub fn candidate_models(capabilities: &ModelCapabilities) -> Vec<ModelKind> {
    ModelKind::ALL
        .into_iter()
        .filter(|k| *k != ModelKind::Prophet || capabilities.prophet)
        .collect()
}

/// Backtest, select and refit.
pub fn select_and_forecast(
    series: &DailySeries,
    horizon: usize,
    config: &EngineConfig,
    ctx: &FitContext,
) -> ModelSelection {
    let candidates = candidate_models(&ctx.capabilities);

    if series.len() < config.min_backtest_points {
        debug!(
            data_points = series.len(),
            min = config.min_backtest_points,
            "too little history to backtest"
        );
        let outcome = run_chain(ModelKind::ExponentialSmoothing, series, horizon, ctx);
        return ModelSelection {
            best_model: outcome.executed,
            winner: None,
            performances: Vec::new(),
            points: outcome.points,
            candidates,
        };
    }

    let performances = backtest_candidates(series, &candidates, config.holdout_days, ctx);
    let winner = pick_winner(&performances).cloned();
    let requested = winner
        .as_ref()
        .map_or(ModelKind::ExponentialSmoothing, |w| w.model_name);

    let outcome = run_chain(requested, series, horizon, ctx);
    ModelSelection {
        best_model: outcome.executed,
        winner,
        performances,
        points: outcome.points,
        candidates,
    }
}

/// Highest `confidence_score`; ties go to the earlier declared model.
pub fn pick_winner(performances: &[ModelPerformance]) -> Option<&ModelPerformance> {
    let mut best: Option<&ModelPerformance> = None;
    for p in performances {
        if !p.confidence_score.is_finite() {
            continue;
        }
        best = match best {
            Some(b)
                if b.confidence_score > p.confidence_score
                    || (b.confidence_score == p.confidence_score && b.model_name < p.model_name) =>
            {
                Some(b)
            }
            _ => Some(p),
        };
    }
    best
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

    fn perf(kind: ModelKind, score: f64) -> ModelPerformance {
        ModelPerformance {
            model_name: kind,
            executed_model: kind,
            mae: 0.0,
            rmse: 0.0,
            mape: 0.0,
            confidence_score: score,
        }
    }

    #[test]
    fn ties_go_to_declared_order() {
        let perfs = vec![
            perf(ModelKind::Arima, 0.8),
            perf(ModelKind::ExponentialSmoothing, 0.8),
            perf(ModelKind::MovingAverage, 0.7),
        ];
        let w = pick_winner(&perfs).unwrap();
        assert_eq!(w.model_name, ModelKind::ExponentialSmoothing);
    }

    #[test]
    fn highest_score_wins() {
        let perfs = vec![perf(ModelKind::MovingAverage, 0.5), perf(ModelKind::Prophet, 0.9)];
        assert_eq!(pick_winner(&perfs).unwrap().model_name, ModelKind::Prophet);
        assert!(pick_winner(&[]).is_none());
    }

    #[test]
    fn prophet_is_only_a_candidate_when_available() {
        assert_eq!(candidate_models(&ModelCapabilities::core_only()).len(), 3);
        assert_eq!(
            candidate_models(&ModelCapabilities { prophet: true }),
            ModelKind::ALL.to_vec()
        );
    }

    #[test]
    fn short_history_skips_backtest() {
        let s = series(vec![4.0, 5.0, 6.0, 5.0, 4.0, 5.0, 6.0]);
        let sel = select_and_forecast(&s, 30, &EngineConfig::default(), &FitContext::default());
        assert!(!sel.backtested());
        assert!(sel.winner.is_none());
        assert_eq!(sel.best_model, ModelKind::ExponentialSmoothing);
        assert_eq!(sel.points.len(), 30);
    }

    #[test]
    fn constant_history_is_backtested_and_refit() {
        let s = series(vec![10.0; 60]);
        let sel = select_and_forecast(&s, 30, &EngineConfig::default(), &FitContext::default());
        assert!(sel.backtested());
        assert_eq!(sel.performances.len(), sel.candidates.len());
        // Every candidate forecasts the constant exactly; moving average is first.
        let winner = sel.winner.as_ref().unwrap();
        assert_eq!(winner.model_name, ModelKind::MovingAverage);
        assert_eq!(sel.best_model, ModelKind::MovingAverage);
        assert!(sel.points.iter().all(|p| (p.predicted_quantity - 10.0).abs() < 1e-9));
    }
}
