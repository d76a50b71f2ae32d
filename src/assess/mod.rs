//! Series diagnostics computed before modeling: data quality, seasonality, trend.

pub mod quality;
pub mod seasonality;
pub mod trend;

pub use quality::*;
pub use seasonality::*;
pub use trend::*;
