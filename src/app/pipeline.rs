//! The forecasting pipeline shared by the library API and the CLI.
//!
//! One call runs, in order:
//! build series -> assess quality -> seasonality -> trend -> backtest/select ->
//! refit winner -> confidence -> inventory risk -> assemble result
//!
//! The engine keeps no state between calls; everything it needs beyond the
//! request is the immutable `EngineConfig` and `ModelCapabilities`.

use chrono::NaiveDate;
use tracing::{debug, info, info_span};

use crate::assess::{analyze_seasonality, analyze_trend, assess_quality};
use crate::domain::{
    DEFAULT_HORIZON_DAYS, DemandForecastResult, EngineConfig, ForecastProvenance, ModelCapabilities,
    RawSalesRecord, SalesObservation, validate_records,
};
use crate::error::{ForecastError, InputError};
use crate::fit::select_and_forecast;
use crate::models::FitContext;
use crate::risk::{assess_risk, compose_confidence};
use crate::series::build_daily_series;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input of one forecast call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub product_id: String,
    pub product_name: String,
    pub sales_history: Vec<SalesObservation>,
    pub forecast_horizon_days: usize,
    pub current_inventory: Option<f64>,
    /// "Today" for recency checks. Defaults to the last observed sale date.
    pub as_of: Option<NaiveDate>,
}

impl ForecastRequest {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        sales_history: Vec<SalesObservation>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            sales_history,
            forecast_horizon_days: DEFAULT_HORIZON_DAYS,
            current_inventory: None,
            as_of: None,
        }
    }

    /// Build a request from loosely typed records, validating every one.
    pub fn from_raw(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        records: &[RawSalesRecord],
    ) -> Result<Self, InputError> {
        Ok(Self::new(product_id, product_name, validate_records(records)?))
    }

    pub fn with_horizon(mut self, days: usize) -> Self {
        self.forecast_horizon_days = days;
        self
    }

    pub fn with_inventory(mut self, inventory: f64) -> Self {
        self.current_inventory = Some(inventory);
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    fn validate(&self) -> Result<(), InputError> {
        if self.forecast_horizon_days == 0 {
            return Err(InputError::InvalidHorizon);
        }
        if let Some(inv) = self.current_inventory {
            if !(inv.is_finite() && inv >= 0.0) {
                return Err(InputError::InvalidInventory(inv));
            }
        }
        if self.sales_history.is_empty() {
            return Err(InputError::EmptyHistory);
        }
        for (index, obs) in self.sales_history.iter().enumerate() {
            SalesObservation::try_new(index, obs.date, obs.quantity)?;
        }
        Ok(())
    }
}

/// Demand forecaster with fixed configuration and model capabilities.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: EngineConfig,
    ctx: FitContext,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), ModelCapabilities::detect())
    }
}

impl ForecastEngine {
    pub fn new(config: EngineConfig, capabilities: ModelCapabilities) -> Self {
        let ctx = FitContext::new(&config, capabilities);
        Self { config, ctx }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &ModelCapabilities {
        &self.ctx.capabilities
    }

    /// Run the full pipeline for one product.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<DemandForecastResult, ForecastError> {
        let span = info_span!("forecast", product_id = %request.product_id);
        let _guard = span.enter();

        request.validate()?;
        let horizon = request.forecast_horizon_days;

        let series = build_daily_series(&request.sales_history)?;
        let as_of = request.as_of.unwrap_or_else(|| series.last_observed());
        debug!(
            data_points = series.len(),
            start = %series.start(),
            end = %series.end(),
            %as_of,
            "built daily series"
        );

        let quality = assess_quality(&series, horizon, as_of);
        let seasonality = analyze_seasonality(&series);
        let trend = analyze_trend(&series);

        let selection = select_and_forecast(&series, horizon, &self.config, &self.ctx);
        let confidence = compose_confidence(
            series.len(),
            selection.winner.as_ref().map(|w| w.confidence_score),
            &selection.points,
            quality.quality_score,
        );
        let risk = assess_risk(
            &selection.points,
            request.current_inventory,
            confidence.final_confidence,
            &self.config,
        );

        info!(
            best_model = selection.best_model.as_str(),
            backtested = selection.backtested(),
            quality = quality.quality_score,
            final_confidence = confidence.final_confidence,
            alerts = risk.alerts.len(),
            "forecast complete"
        );

        let backtested = selection.backtested();
        Ok(DemandForecastResult {
            product_id: request.product_id.clone(),
            product_name: request.product_name.clone(),
            forecast_points: selection.points,
            seasonality,
            trend,
            model_performances: selection.performances,
            best_model: selection.best_model,
            alerts: risk.alerts,
            reorder_recommendation: risk.reorder_recommendation,
            days_of_stock: risk.days_of_stock,
            base_confidence: confidence.base_confidence,
            data_quality_score: quality.quality_score,
            final_confidence: confidence.final_confidence,
            confidence_factors: confidence.factors,
            qa_metadata: quality.metadata,
            metadata: ForecastProvenance {
                as_of,
                history_start: series.start(),
                history_end: series.end(),
                data_points: series.len(),
                horizon_days: horizon,
                candidates: selection.candidates,
                backtested,
                engine_version: ENGINE_VERSION.to_string(),
            },
        })
    }
}

/// Forecast with the default configuration and this build's capabilities.
///
/// Results are deterministic as long as no model fit runs past
/// `fit_timeout_ms`; a fit that times out falls back to a simpler model.
pub fn forecast_demand(request: &ForecastRequest) -> Result<DemandForecastResult, ForecastError> {
    ForecastEngine::default().forecast(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelKind, QualityPenalty};

    fn history(values: &[f64]) -> Vec<SalesObservation> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &q)| SalesObservation {
                date: start + chrono::Duration::days(i as i64),
                quantity: q,
            })
            .collect()
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let req = ForecastRequest::new("p1", "Widget", history(&[1.0; 20])).with_horizon(0);
        assert_eq!(
            forecast_demand(&req),
            Err(ForecastError::Input(InputError::InvalidHorizon))
        );
    }

    #[test]
    fn empty_history_is_rejected() {
        let req = ForecastRequest::new("p1", "Widget", Vec::new());
        assert_eq!(
            forecast_demand(&req),
            Err(ForecastError::Input(InputError::EmptyHistory))
        );
    }

    #[test]
    fn negative_inventory_is_rejected() {
        let req = ForecastRequest::new("p1", "Widget", history(&[1.0; 20])).with_inventory(-1.0);
        assert!(matches!(
            forecast_demand(&req),
            Err(ForecastError::Input(InputError::InvalidInventory(_)))
        ));
    }

    #[test]
    fn from_raw_reports_missing_quantity() {
        let records = vec![
            RawSalesRecord::new("2025-01-01", 3.0),
            RawSalesRecord {
                date: Some("2025-01-02".into()),
                quantity: None,
            },
        ];
        assert_eq!(
            ForecastRequest::from_raw("p1", "Widget", &records),
            Err(InputError::MissingField {
                index: 1,
                field: "quantity"
            })
        );
    }

    #[test]
    fn as_of_defaults_to_last_observed_sale() {
        let req = ForecastRequest::new("p1", "Widget", history(&[5.0, 6.0, 7.0, 5.0, 6.0]));
        let result = forecast_demand(&req).unwrap();
        assert_eq!(result.metadata.as_of, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(result.qa_metadata.days_since_last_sale, 0);
        assert!(!result.metadata.backtested);
    }

    #[test]
    fn stale_history_is_penalized() {
        let req = ForecastRequest::new("p1", "Widget", history(&[5.0, 6.0, 7.0, 5.0, 6.0]))
            .with_as_of(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let result = forecast_demand(&req).unwrap();
        assert!(result.qa_metadata.penalties_applied.contains(&QualityPenalty::StaleData));
    }

    #[test]
    fn core_only_engine_never_reports_prophet() {
        let values: Vec<f64> = (0..45).map(|i| 12.0 + (i % 7) as f64).collect();
        let engine = ForecastEngine::new(EngineConfig::default(), ModelCapabilities::core_only());
        let result = engine
            .forecast(&ForecastRequest::new("p1", "Widget", history(&values)))
            .unwrap();
        assert!(!result.metadata.candidates.contains(&ModelKind::Prophet));
        assert_ne!(result.best_model, ModelKind::Prophet);
        assert_eq!(result.model_performances.len(), 3);
        assert_eq!(result.forecast_points.len(), 30);
    }
}
