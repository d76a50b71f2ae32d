//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - deterministic parameter grids for the iterative models (parallel)
//! - fallback chains from a requested model down to the moving average
//! - holdout backtesting of every candidate (parallel)
//! - selection of the winner and its refit on the full history

pub mod backtest;
pub mod fallback;
pub mod param_grid;
pub mod selection;

pub use backtest::*;
pub use fallback::*;
pub use param_grid::*;
pub use selection::*;
