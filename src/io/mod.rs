//! Input/output helpers.
//!
//! - sales history CSV ingest + validation (`ingest`)
//! - result exports (JSON/CSV) and sales CSV writing (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
