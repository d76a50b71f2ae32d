//! Inventory alerts and reorder quantity.
//!
//! Stock coverage is measured against the first week of the forecast:
//!
//! ```text
//! avg_daily_demand = mean(predicted[..7])
//! days_of_stock    = inventory / (avg_daily_demand + 1)
//! reorder          = max(0, round(sum(predicted[..30]) × safety − inventory))
//! ```
//!
//! Every rule is checked independently, so one call can raise several alerts.
//! Stockout and reorder rules only apply while some demand is expected.

use crate::domain::{AlertType, EngineConfig, ForecastPoint, InventoryAlert, Severity};
use crate::math::mean;

const DEMAND_WINDOW: usize = 7;
const REORDER_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RiskAssessment {
    pub alerts: Vec<InventoryAlert>,
    pub reorder_recommendation: Option<u64>,
    pub days_of_stock: Option<f64>,
}

pub fn assess_risk(
    points: &[ForecastPoint],
    current_inventory: Option<f64>,
    final_confidence: f64,
    config: &EngineConfig,
) -> RiskAssessment {
    let mut out = RiskAssessment::default();

    if let Some(inventory) = current_inventory {
        let first_week: Vec<f64> = points
            .iter()
            .take(DEMAND_WINDOW)
            .map(|p| p.predicted_quantity)
            .collect();
        let avg_daily_demand = mean(&first_week);
        let days_of_stock = inventory / (avg_daily_demand + 1.0);
        let days_until = days_of_stock.max(0.0).floor() as u32;
        out.days_of_stock = Some(days_of_stock);

        if avg_daily_demand > 0.0 {
            if days_of_stock < config.critical_stock_days {
                out.alerts.push(InventoryAlert {
                    alert_type: AlertType::StockoutRisk,
                    severity: Severity::Critical,
                    message: format!("Stock runs out in about {days_of_stock:.1} days."),
                    recommended_action: "Place an urgent reorder or expedite inbound stock.".into(),
                    days_until_event: Some(days_until),
                });
            }
            if days_of_stock < config.high_stock_days {
                out.alerts.push(InventoryAlert {
                    alert_type: AlertType::StockoutRisk,
                    severity: Severity::High,
                    message: format!("Stock covers only {days_of_stock:.1} days of demand."),
                    recommended_action: "Reorder this week.".into(),
                    days_until_event: Some(days_until),
                });
            }
            if days_of_stock < config.reorder_stock_days {
                out.alerts.push(InventoryAlert {
                    alert_type: AlertType::ReorderPoint,
                    severity: Severity::Medium,
                    message: format!(
                        "Stock is below the {}-day reorder point.",
                        config.reorder_stock_days
                    ),
                    recommended_action: "Plan a replenishment order.".into(),
                    days_until_event: Some(days_until),
                });
            }
        }
        if days_of_stock > config.overstock_days {
            out.alerts.push(InventoryAlert {
                alert_type: AlertType::OverstockRisk,
                severity: Severity::Medium,
                message: format!("Stock covers {days_of_stock:.0} days of forecast demand."),
                recommended_action: "Pause replenishment or consider a promotion.".into(),
                days_until_event: None,
            });
        }

        let demand: f64 = points
            .iter()
            .take(REORDER_WINDOW)
            .map(|p| p.predicted_quantity)
            .sum();
        let reorder = (demand * config.safety_stock_factor - inventory).round().max(0.0);
        out.reorder_recommendation = Some(reorder as u64);
    }

    if final_confidence < config.low_confidence_threshold {
        out.alerts.push(InventoryAlert {
            alert_type: AlertType::LowConfidence,
            severity: Severity::Low,
            message: format!("Forecast confidence is low ({:.0}%).", final_confidence * 100.0),
            recommended_action: "Review the sales history before acting on this forecast.".into(),
            days_until_event: None,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flat(value: f64, n: usize) -> Vec<ForecastPoint> {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        (0..n)
            .map(|i| ForecastPoint::from_value(d + chrono::Duration::days(i as i64), value, 0.0, 1.0))
            .collect()
    }

    fn types(r: &RiskAssessment) -> Vec<(AlertType, Severity)> {
        r.alerts.iter().map(|a| (a.alert_type, a.severity)).collect()
    }

    #[test]
    fn no_inventory_means_no_inventory_alerts() {
        let r = assess_risk(&flat(10.0, 30), None, 0.9, &EngineConfig::default());
        assert!(r.alerts.is_empty());
        assert_eq!(r.reorder_recommendation, None);
        assert_eq!(r.days_of_stock, None);
    }

    #[test]
    fn near_empty_stock_is_critical() {
        let r = assess_risk(&flat(10.0, 30), Some(5.0), 0.9, &EngineConfig::default());
        assert_eq!(
            types(&r),
            vec![
                (AlertType::StockoutRisk, Severity::Critical),
                (AlertType::StockoutRisk, Severity::High),
                (AlertType::ReorderPoint, Severity::Medium)
            ]
        );
        assert!((r.days_of_stock.unwrap() - 5.0 / 11.0).abs() < 1e-12);
        assert!(r.alerts.iter().all(|a| a.days_until_event == Some(0)));
        // 300 × 1.2 − 5
        assert_eq!(r.reorder_recommendation, Some(355));
    }

    #[test]
    fn five_days_of_stock_is_high() {
        let r = assess_risk(&flat(9.0, 30), Some(50.0), 0.9, &EngineConfig::default());
        assert_eq!(
            types(&r),
            vec![
                (AlertType::StockoutRisk, Severity::High),
                (AlertType::ReorderPoint, Severity::Medium)
            ]
        );
        assert_eq!(r.alerts[0].days_until_event, Some(5));
    }

    #[test]
    fn large_stock_is_overstock_and_never_negative_reorder() {
        let r = assess_risk(&flat(10.0, 30), Some(5000.0), 0.9, &EngineConfig::default());
        assert_eq!(types(&r), vec![(AlertType::OverstockRisk, Severity::Medium)]);
        assert_eq!(r.alerts[0].days_until_event, None);
        assert_eq!(r.reorder_recommendation, Some(0));
    }

    #[test]
    fn zero_demand_never_stocks_out() {
        let r = assess_risk(&flat(0.0, 30), Some(0.0), 0.9, &EngineConfig::default());
        assert!(r.alerts.is_empty());
        assert_eq!(r.reorder_recommendation, Some(0));
    }

    #[test]
    fn low_confidence_runs_without_inventory() {
        let r = assess_risk(&flat(10.0, 30), None, 0.3, &EngineConfig::default());
        assert_eq!(types(&r), vec![(AlertType::LowConfidence, Severity::Low)]);
    }
}
