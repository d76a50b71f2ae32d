//! Multi-factor forecast confidence.
//!
//! ```text
//! data      = min(1, N / 60)
//! model     = winner's backtest score, or 0.6 without a backtest
//! stability = 1 / (1 + std(pred) / (mean(pred) + 1))   (only if std(pred) ≠ 0)
//! base      = geometric mean of the factors present
//! final     = base × quality_score
//! ```

use crate::domain::{ConfidenceFactors, ForecastPoint};
use crate::math::{geometric_mean, mean, std_pop};

const FULL_DATA_POINTS: f64 = 60.0;
const DEFAULT_MODEL_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBreakdown {
    pub factors: ConfidenceFactors,
    pub base_confidence: f64,
    pub final_confidence: f64,
}

pub fn compose_confidence(
    data_points: usize,
    winner_score: Option<f64>,
    points: &[ForecastPoint],
    quality_score: f64,
) -> ConfidenceBreakdown {
    let data_factor = (data_points as f64 / FULL_DATA_POINTS).min(1.0);
    let model_factor = winner_score
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_MODEL_FACTOR);

    let predicted: Vec<f64> = points.iter().map(|p| p.predicted_quantity).collect();
    let spread = std_pop(&predicted);
    let stability_factor = (spread != 0.0).then(|| 1.0 / (1.0 + spread / (mean(&predicted) + 1.0)));

    let mut present = vec![data_factor, model_factor];
    present.extend(stability_factor);
    let base_confidence = geometric_mean(&present).clamp(0.0, 1.0);

    ConfidenceBreakdown {
        factors: ConfidenceFactors {
            data_factor,
            model_factor,
            stability_factor,
        },
        base_confidence,
        final_confidence: base_confidence * quality_score,
    }
}
