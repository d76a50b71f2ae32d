//! Forecast confidence and inventory risk.

pub mod advisor;
pub mod confidence;

pub use advisor::*;
pub use confidence::*;
