//! Raw sales records -> gap-filled daily series.

pub mod builder;

pub use builder::*;
