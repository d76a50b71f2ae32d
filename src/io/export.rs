//! Result exports.
//!
//! - JSON: the full `DemandForecastResult`, reloadable for `demand plot`
//! - CSV: one row per forecast day, easy to consume in spreadsheets
//! - CSV: a sales history in the format `ingest` reads (used by `demand sample`)

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DemandForecastResult, SalesObservation};
use crate::error::AppError;

/// Write the full result as pretty JSON.
pub fn write_result_json(path: &Path, result: &DemandForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON written by `write_result_json`.
pub fn read_result_json(path: &Path) -> Result<DemandForecastResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))
}

#[derive(Debug, Serialize)]
struct ForecastRow<'a> {
    product_id: &'a str,
    model: &'static str,
    date: NaiveDate,
    predicted_quantity: f64,
    lower_bound: f64,
    upper_bound: f64,
    confidence: f64,
}

/// Write the forecast points to CSV.
pub fn write_forecast_csv(path: &Path, result: &DemandForecastResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for p in &result.forecast_points {
        writer
            .serialize(ForecastRow {
                product_id: &result.product_id,
                model: result.best_model.as_str(),
                date: p.date,
                predicted_quantity: round(p.predicted_quantity, 2),
                lower_bound: round(p.lower_bound, 2),
                upper_bound: round(p.upper_bound, 2),
                confidence: round(p.confidence, 4),
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write a `date,quantity` sales history.
pub fn write_sales_csv(path: &Path, history: &[SalesObservation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sales CSV '{}': {e}", path.display())))?;
    for obs in history {
        writer
            .serialize(obs)
            .map_err(|e| AppError::new(2, format!("Failed to write sales CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sales CSV: {e}")))?;
    Ok(())
}

fn round(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}
