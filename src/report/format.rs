//! Formatted terminal output for a forecast result.
//!
//! Formatting lives in one place so the engine stays free of presentation
//! concerns and output changes stay localized.

use crate::domain::{DemandForecastResult, ForecastPoint, InventoryAlert, ModelPerformance};
use crate::fit::pick_winner;
use crate::io::ingest::IngestedSales;

/// Number of forecast days listed in the summary table.
const TABLE_DAYS: usize = 14;

/// Format the full run summary: inputs, quality, models, confidence, risk.
pub fn format_forecast_summary(result: &DemandForecastResult, ingest: Option<&IngestedSales>) -> String {
    let mut out = String::new();
    let meta = &result.metadata;

    out.push_str("=== demand - Demand Forecast ===\n");
    out.push_str(&format!(
        "Product: {} ({})\n",
        result.product_name, result.product_id
    ));
    out.push_str(&format!(
        "History: {} .. {} | n={} days | as-of {}\n",
        meta.history_start, meta.history_end, meta.data_points, meta.as_of
    ));
    if let Some(ingest) = ingest {
        out.push_str(&format!(
            "Rows: read={} used={} skipped={}\n",
            ingest.rows_read,
            ingest.rows_used(),
            ingest.row_errors.len()
        ));
        for e in ingest.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    let qa = &result.qa_metadata;
    out.push_str(&format!(
        "\nData quality: {:.2} | zeros={:.0}% | cv={} | days since last sale={}\n",
        result.data_quality_score,
        qa.zero_ratio * 100.0,
        qa.coefficient_of_variation
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "-".to_string()),
        qa.days_since_last_sale
    ));
    if !qa.penalties_applied.is_empty() {
        let names: Vec<&str> = qa.penalties_applied.iter().map(|p| p.as_str()).collect();
        out.push_str(&format!("Penalties: {}\n", names.join(", ")));
    }

    let s = &result.seasonality;
    out.push_str(&format!(
        "Seasonality: weekly {:.2}{} | monthly {:.2}{}\n",
        s.weekly.strength,
        if s.weekly.detected { " (detected)" } else { "" },
        s.monthly.strength,
        if s.monthly.detected { " (detected)" } else { "" },
    ));
    out.push_str(&format!("Trend: {}\n", result.trend.as_str()));

    out.push_str("\nModel backtest (last 7 days held out):\n");
    out.push_str(&format_model_table(&result.model_performances));
    out.push_str(&format!(
        "Chosen model: {}\n",
        result.best_model.display_name()
    ));

    let f = &result.confidence_factors;
    out.push_str(&format!(
        "\nConfidence: final={:.2} = base {:.2} x quality {:.2} (data {:.2}, model {:.2}, stability {})\n",
        result.final_confidence,
        result.base_confidence,
        result.data_quality_score,
        f.data_factor,
        f.model_factor,
        f.stability_factor
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string()),
    ));

    out.push_str(&format!(
        "\nForecast ({} days, first {} shown):\n",
        result.forecast_points.len(),
        TABLE_DAYS.min(result.forecast_points.len())
    ));
    out.push_str(&format_forecast_table(&result.forecast_points, TABLE_DAYS));
    let total: f64 = result.forecast_points.iter().map(|p| p.predicted_quantity).sum();
    out.push_str(&format!("Total forecast demand: {total:.1}\n"));

    out.push_str("\nInventory:\n");
    match (result.days_of_stock, result.reorder_recommendation) {
        (Some(days), Some(reorder)) => {
            out.push_str(&format!("- days of stock: {days:.1}\n"));
            out.push_str(&format!("- reorder recommendation: {reorder} units\n"));
        }
        _ => out.push_str("- no inventory level given\n"),
    }
    out.push_str(&format_alerts(&result.alerts));

    out
}

/// Backtest table; the winning candidate is starred, even if its refit fell back.
pub fn format_model_table(performances: &[ModelPerformance]) -> String {
    if performances.is_empty() {
        return "  (not enough history to backtest)\n".to_string();
    }
    let winner = pick_winner(performances).map(|w| w.model_name);
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:<24} {:>9} {:>9} {:>9} {:>7} {:<22}\n",
            "model", "MAE", "RMSE", "MAPE%", "score", "ran as"
        )
        .trim_end(),
    );
    out.push('\n');
    for p in performances {
        let chosen = if Some(p.model_name) == winner { "*" } else { " " };
        let ran_as = if p.executed_model == p.model_name {
            String::new()
        } else {
            p.executed_model.as_str().to_string()
        };
        out.push_str(
            format!(
                "{chosen} {:<24} {:>9.2} {:>9.2} {:>9.1} {:>7.3} {:<22}\n",
                truncate(p.model_name.display_name(), 24),
                p.mae,
                p.rmse,
                p.mape,
                p.confidence_score,
                ran_as
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// The first `max_rows` forecast days.
pub fn format_forecast_table(points: &[ForecastPoint], max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<10} {:>10} {:>10} {:>10} {:>6}\n",
        "date", "predicted", "lower", "upper", "conf"
    ));
    for p in points.iter().take(max_rows) {
        out.push_str(&format!(
            "  {:<10} {:>10.2} {:>10.2} {:>10.2} {:>6.2}\n",
            p.date.to_string(),
            p.predicted_quantity,
            p.lower_bound,
            p.upper_bound,
            p.confidence
        ));
    }
    out
}

pub fn format_alerts(alerts: &[InventoryAlert]) -> String {
    if alerts.is_empty() {
        return "Alerts: none\n".to_string();
    }
    let mut out = String::from("Alerts:\n");
    for a in alerts {
        let when = a
            .days_until_event
            .map(|d| format!(" (in {d} days)"))
            .unwrap_or_default();
        out.push_str(&format!(
            "- [{}] {}{}\n    -> {}\n",
            a.severity.as_str().to_uppercase(),
            a.message,
            when,
            a.recommended_action
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
