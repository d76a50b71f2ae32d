//! `demand-forecast` library crate.
//!
//! The binary (`demand`) is a thin wrapper around this library so that:
//!
//! - the forecasting engine is testable without spawning processes
//! - the engine can be embedded in a service that owns persistence/transport
//! - code stays easy to navigate as the project grows
//!
//! Library entry points: [`forecast_demand`] and [`ForecastEngine`].

pub mod app;
pub mod assess;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod risk;
pub mod series;

pub use app::pipeline::{ForecastEngine, ForecastRequest, forecast_demand};
pub use domain::{DemandForecastResult, EngineConfig, ModelCapabilities};
pub use error::{ForecastError, InputError};
