//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A validated sales observation: one `(date, quantity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl SalesObservation {
    /// Build an observation, rejecting negative or non-finite quantities.
    ///
    /// `index` is the record position, used only for error messages.
    pub fn try_new(index: usize, date: NaiveDate, quantity: f64) -> Result<Self, InputError> {
        if !(quantity.is_finite() && quantity >= 0.0) {
            return Err(InputError::InvalidQuantity {
                index,
                value: quantity,
            });
        }
        Ok(Self { date, quantity })
    }
}

/// A loosely typed sales record as handed over by an upstream collaborator
/// (JSON payload, CSV row, ...). Both fields are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRecord {
    pub date: Option<String>,
    pub quantity: Option<f64>,
}

impl RawSalesRecord {
    pub fn new(date: impl Into<String>, quantity: f64) -> Self {
        Self {
            date: Some(date.into()),
            quantity: Some(quantity),
        }
    }

    /// Validate into a typed observation.
    pub fn validate(&self, index: usize) -> Result<SalesObservation, InputError> {
        let raw_date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(InputError::MissingField {
                index,
                field: "date",
            })?;
        let quantity = self.quantity.ok_or(InputError::MissingField {
            index,
            field: "quantity",
        })?;
        let date = parse_date(raw_date).ok_or_else(|| InputError::InvalidDate {
            index,
            value: raw_date.to_string(),
        })?;
        SalesObservation::try_new(index, date, quantity)
    }
}

/// Validate a batch of raw records, failing on the first malformed one.
pub fn validate_records(records: &[RawSalesRecord]) -> Result<Vec<SalesObservation>, InputError> {
    if records.is_empty() {
        return Err(InputError::EmptyHistory);
    }
    records
        .iter()
        .enumerate()
        .map(|(i, r)| r.validate(i))
        .collect()
}

/// Parse `YYYY-MM-DD`, or the date part of an ISO/RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    None
}

/// A gap-free daily series from `start` to `start + len - 1`.
///
/// Missing days carry quantity 0. `last_observed` is the latest date that was
/// present in the raw input (as opposed to a filled-in day).
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
    last_observed: NaiveDate,
}

impl DailySeries {
    /// Wrap pre-filled daily values.
    ///
    /// Returns `None` for an empty series.
    pub fn new(start: NaiveDate, values: Vec<f64>, last_observed: NaiveDate) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            start,
            values,
            last_observed,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.date_at(self.values.len() - 1)
    }

    pub fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    pub fn date_at(&self, idx: usize) -> NaiveDate {
        self.start + Duration::days(idx as i64)
    }

    /// Dates and quantities in order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &q)| (self.date_at(i), q))
    }

    /// The first `n` days as a new series (`n` is clamped to `1..=len`).
    pub fn head(&self, n: usize) -> DailySeries {
        let n = n.clamp(1, self.values.len());
        let end = self.date_at(n - 1);
        DailySeries {
            start: self.start,
            values: self.values[..n].to_vec(),
            last_observed: self.last_observed.min(end),
        }
    }

    /// The last `n` values (`n` is clamped to `len`).
    pub fn tail(&self, n: usize) -> &[f64] {
        let n = n.min(self.values.len());
        &self.values[self.values.len() - n..]
    }
}

/// One forecast day.
///
/// Invariant: `0 <= lower_bound <= predicted_quantity <= upper_bound` and
/// `0 <= confidence <= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    #[serde(serialize_with = "round2")]
    pub predicted_quantity: f64,
    #[serde(serialize_with = "round2")]
    pub lower_bound: f64,
    #[serde(serialize_with = "round2")]
    pub upper_bound: f64,
    #[serde(serialize_with = "round4")]
    pub confidence: f64,
}

impl ForecastPoint {
    /// Build a point from a raw model value and a half-width.
    ///
    /// Clips the prediction at zero and orders the bounds around it.
    pub fn from_value(date: NaiveDate, value: f64, uncertainty: f64, confidence: f64) -> Self {
        let predicted = if value.is_finite() { value.max(0.0) } else { 0.0 };
        let u = if uncertainty.is_finite() {
            uncertainty.abs()
        } else {
            0.0
        };
        Self {
            date,
            predicted_quantity: predicted,
            lower_bound: (predicted - u).max(0.0),
            upper_bound: predicted + u,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Build a point from explicit interval bounds (clipped at zero).
    pub fn from_interval(date: NaiveDate, value: f64, lower: f64, upper: f64, confidence: f64) -> Self {
        let predicted = if value.is_finite() { value.max(0.0) } else { 0.0 };
        let lower = if lower.is_finite() { lower.max(0.0) } else { 0.0 };
        let upper = if upper.is_finite() { upper.max(0.0) } else { predicted };
        Self {
            date,
            predicted_quantity: predicted,
            lower_bound: lower.min(predicted),
            upper_bound: upper.max(predicted),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Candidate forecasting model.
///
/// Declaration order is the selection tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    MovingAverage,
    ExponentialSmoothing,
    Arima,
    Prophet,
}

impl ModelKind {
    /// All candidates in their declared order.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::MovingAverage,
        ModelKind::ExponentialSmoothing,
        ModelKind::Arima,
        ModelKind::Prophet,
    ];

    /// Stable identifier used in exports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::MovingAverage => "moving_average",
            ModelKind::ExponentialSmoothing => "exponential_smoothing",
            ModelKind::Arima => "arima",
            ModelKind::Prophet => "prophet",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::MovingAverage => "Moving average (7d)",
            ModelKind::ExponentialSmoothing => "Exponential smoothing",
            ModelKind::Arima => "ARIMA(1,1,1)",
            ModelKind::Prophet => "Prophet",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalPeriod {
    Weekly,
    Monthly,
}

impl SeasonalPeriod {
    pub fn days(self) -> usize {
        match self {
            SeasonalPeriod::Weekly => 7,
            SeasonalPeriod::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityPattern {
    pub period: SeasonalPeriod,
    #[serde(serialize_with = "round4")]
    pub strength: f64,
    pub detected: bool,
}

impl SeasonalityPattern {
    /// Pattern used when there is not enough data (or the decomposition failed).
    pub fn undetected(period: SeasonalPeriod) -> Self {
        Self {
            period,
            strength: 0.0,
            detected: false,
        }
    }
}

/// Weekly and monthly seasonality, keyed by period name when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub weekly: SeasonalityPattern,
    pub monthly: SeasonalityPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Backtest score of one candidate on the held-out week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub model_name: ModelKind,
    /// The model that actually produced the backtest forecast after fallback.
    pub executed_model: ModelKind,
    #[serde(serialize_with = "round2")]
    pub mae: f64,
    #[serde(serialize_with = "round2")]
    pub rmse: f64,
    #[serde(serialize_with = "round2")]
    pub mape: f64,
    #[serde(serialize_with = "round4")]
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    StockoutRisk,
    OverstockRisk,
    ReorderPoint,
    LowConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAlert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub recommended_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_event: Option<u32>,
}

/// Data-quality penalties, in the order they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPenalty {
    InsufficientData,
    LimitedData,
    StaleData,
    HighZeroRatio,
    ModerateZeroRatio,
    NoVariance,
    HighVolatility,
}

impl QualityPenalty {
    /// Multiplier applied to the quality score.
    pub fn factor(self) -> f64 {
        match self {
            QualityPenalty::InsufficientData => 0.5,
            QualityPenalty::LimitedData => 0.8,
            QualityPenalty::StaleData => 0.85,
            QualityPenalty::HighZeroRatio => 0.75,
            QualityPenalty::ModerateZeroRatio => 0.9,
            QualityPenalty::NoVariance => 0.7,
            QualityPenalty::HighVolatility => 0.85,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityPenalty::InsufficientData => "insufficient_data",
            QualityPenalty::LimitedData => "limited_data",
            QualityPenalty::StaleData => "stale_data",
            QualityPenalty::HighZeroRatio => "high_zero_ratio",
            QualityPenalty::ModerateZeroRatio => "moderate_zero_ratio",
            QualityPenalty::NoVariance => "no_variance",
            QualityPenalty::HighVolatility => "high_volatility",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaMetadata {
    pub penalties_applied: Vec<QualityPenalty>,
    pub data_points: usize,
    #[serde(serialize_with = "round4")]
    pub zero_ratio: f64,
    /// `None` when the series has no variance.
    #[serde(serialize_with = "round4_opt")]
    pub coefficient_of_variation: Option<f64>,
    pub days_since_last_sale: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    #[serde(serialize_with = "round4")]
    pub quality_score: f64,
    pub metadata: QaMetadata,
}

/// The factors behind `base_confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    #[serde(serialize_with = "round4")]
    pub data_factor: f64,
    #[serde(serialize_with = "round4")]
    pub model_factor: f64,
    #[serde(serialize_with = "round4_opt")]
    pub stability_factor: Option<f64>,
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastProvenance {
    pub as_of: NaiveDate,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub data_points: usize,
    pub horizon_days: usize,
    pub candidates: Vec<ModelKind>,
    pub backtested: bool,
    pub engine_version: String,
}

/// Aggregate result of one `forecast_demand` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastResult {
    pub product_id: String,
    pub product_name: String,
    pub forecast_points: Vec<ForecastPoint>,
    pub seasonality: Seasonality,
    pub trend: TrendDirection,
    pub model_performances: Vec<ModelPerformance>,
    /// The model that actually produced `forecast_points`.
    pub best_model: ModelKind,
    pub alerts: Vec<InventoryAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_recommendation: Option<u64>,
    #[serde(default, serialize_with = "round2_opt", skip_serializing_if = "Option::is_none")]
    pub days_of_stock: Option<f64>,
    #[serde(serialize_with = "round4")]
    pub base_confidence: f64,
    #[serde(serialize_with = "round4")]
    pub data_quality_score: f64,
    #[serde(serialize_with = "round4")]
    pub final_confidence: f64,
    pub confidence_factors: ConfidenceFactors,
    pub qa_metadata: QaMetadata,
    pub metadata: ForecastProvenance,
}

fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

fn round2<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*v, 2))
}

fn round4<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*v, 4))
}

fn round2_opt<S: serde::Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => s.serialize_some(&round_to(*v, 2)),
        None => s.serialize_none(),
    }
}

fn round4_opt<S: serde::Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => s.serialize_some(&round_to(*v, 4)),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn raw_record_requires_both_fields() {
        let missing_qty = RawSalesRecord {
            date: Some("2025-01-01".to_string()),
            quantity: None,
        };
        assert_eq!(
            missing_qty.validate(4),
            Err(InputError::MissingField {
                index: 4,
                field: "quantity"
            })
        );

        let missing_date = RawSalesRecord {
            date: None,
            quantity: Some(3.0),
        };
        assert!(matches!(
            missing_date.validate(0),
            Err(InputError::MissingField { field: "date", .. })
        ));
    }

    #[test]
    fn raw_record_rejects_negative_quantity_and_bad_dates() {
        assert!(matches!(
            RawSalesRecord::new("2025-01-01", -1.0).validate(0),
            Err(InputError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            RawSalesRecord::new("01/02/2025", 1.0).validate(0),
            Err(InputError::InvalidDate { .. })
        ));
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2025-03-04T10:11:12Z"), Some(d(2025, 3, 4)));
        assert_eq!(parse_date("2025-03-04 10:11:12"), Some(d(2025, 3, 4)));
        assert_eq!(parse_date(" 2025-03-04 "), Some(d(2025, 3, 4)));
    }

    #[test]
    fn forecast_point_bounds_are_ordered_and_clipped() {
        let p = ForecastPoint::from_value(d(2025, 1, 1), -3.0, 2.0, 1.4);
        assert_eq!(p.predicted_quantity, 0.0);
        assert_eq!(p.lower_bound, 0.0);
        assert_eq!(p.upper_bound, 2.0);
        assert_eq!(p.confidence, 1.0);

        let q = ForecastPoint::from_interval(d(2025, 1, 1), 5.0, 6.0, 4.0, 0.7);
        assert!(q.lower_bound <= q.predicted_quantity && q.predicted_quantity <= q.upper_bound);
    }

    #[test]
    fn series_head_keeps_start_and_clamps_last_observed() {
        let s = DailySeries::new(d(2025, 1, 1), vec![1.0, 2.0, 3.0, 4.0], d(2025, 1, 4)).unwrap();
        let h = s.head(2);
        assert_eq!(h.len(), 2);
        assert_eq!(h.end(), d(2025, 1, 2));
        assert_eq!(h.last_observed(), d(2025, 1, 2));
        assert_eq!(s.tail(2), &[3.0, 4.0]);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&AlertType::StockoutRisk).unwrap();
        assert_eq!(json, "\"stockout_risk\"");
        let json = serde_json::to_string(&ModelKind::ExponentialSmoothing).unwrap();
        assert_eq!(json, "\"exponential_smoothing\"");
    }

    #[test]
    fn forecast_point_serializes_rounded() {
        let p = ForecastPoint::from_value(d(2025, 1, 1), 1.23456, 0.0, 0.123456);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["predicted_quantity"], serde_json::json!(1.23));
        assert_eq!(json["confidence"], serde_json::json!(0.1235));
        assert_eq!(json["date"], serde_json::json!("2025-01-01"));
    }
}
