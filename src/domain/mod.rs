//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated sales input (`SalesObservation`, `RawSalesRecord`) and the
//!   gap-filled `DailySeries`
//! - forecast outputs (`ForecastPoint`, `DemandForecastResult`, alerts, scores)
//! - engine configuration (`EngineConfig`, `ModelCapabilities`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
