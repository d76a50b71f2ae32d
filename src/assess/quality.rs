//! Data-quality assessment.
//!
//! The score starts at `1.0` and is multiplied by a factor for every penalty
//! that fires. Penalties are grouped; within a group the first match wins:
//!
//! 1. volume: `insufficient_data` (N < 14) or `limited_data` (N < 2 × horizon)
//! 2. recency: `stale_data` (last observed sale more than 7 days before as-of)
//! 3. sparsity: `high_zero_ratio` (> 0.5) or `moderate_zero_ratio` (> 0.3)
//! 4. variability: `no_variance` (std = 0) or `high_volatility` (cv > 0.8)

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DailySeries, QaMetadata, QualityAssessment, QualityPenalty};
use crate::math::{mean, std_sample};

const MIN_POINTS: usize = 14;
const STALE_AFTER_DAYS: i64 = 7;
const HIGH_ZERO_RATIO: f64 = 0.5;
const MODERATE_ZERO_RATIO: f64 = 0.3;
const HIGH_CV: f64 = 0.8;

/// Score a series' fitness for forecasting.
pub fn assess_quality(series: &DailySeries, horizon: usize, as_of: NaiveDate) -> QualityAssessment {
    let values = series.values();
    let n = values.len();
    let mut penalties = Vec::new();

    if n < MIN_POINTS {
        penalties.push(QualityPenalty::InsufficientData);
    } else if n < 2 * horizon {
        penalties.push(QualityPenalty::LimitedData);
    }

    let days_since_last_sale = (as_of - series.last_observed()).num_days();
    if days_since_last_sale > STALE_AFTER_DAYS {
        penalties.push(QualityPenalty::StaleData);
    }

    let zeros = values.iter().filter(|&&v| v == 0.0).count();
    let zero_ratio = zeros as f64 / n.max(1) as f64;
    if zero_ratio > HIGH_ZERO_RATIO {
        penalties.push(QualityPenalty::HighZeroRatio);
    } else if zero_ratio > MODERATE_ZERO_RATIO {
        penalties.push(QualityPenalty::ModerateZeroRatio);
    }

    let std = std_sample(values);
    let cv = if std == 0.0 {
        penalties.push(QualityPenalty::NoVariance);
        None
    } else {
        let cv = std / (mean(values) + 1.0);
        if cv > HIGH_CV {
            penalties.push(QualityPenalty::HighVolatility);
        }
        Some(cv)
    };

    let mut quality_score = 1.0;
    for p in &penalties {
        quality_score *= p.factor();
        debug!(penalty = p.as_str(), factor = p.factor(), "data quality warning");
    }

    QualityAssessment {
        quality_score,
        metadata: QaMetadata {
            penalties_applied: penalties,
            data_points: n,
            zero_ratio,
            coefficient_of_variation: cv,
            days_since_last_sale,
        },
    }
}
