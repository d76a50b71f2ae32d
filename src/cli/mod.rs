//! Command-line parsing for the demand forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "demand", version, about = "Demand forecasting & inventory risk engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast demand from a sales CSV, print diagnostics/alerts, and optionally plot/export.
    Forecast(ForecastArgs),
    /// Generate a synthetic daily sales CSV.
    Sample(SampleArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
}

/// Options for `demand forecast`.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Sales history CSV with `date` and `quantity` (or `qty`/`units`/`sales`) columns.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Product identifier reported in the output.
    #[arg(long, default_value = "product")]
    pub product_id: String,

    /// Product name reported in the output (defaults to the id).
    #[arg(long)]
    pub product_name: Option<String>,

    /// Forecast horizon in days.
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Units currently in stock. Enables stockout/overstock alerts and a reorder quantity.
    #[arg(long)]
    pub inventory: Option<f64>,

    /// Reference date for recency checks (YYYY-MM-DD). Defaults to the last sale date.
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,

    /// Skip invalid CSV rows instead of failing.
    #[arg(long)]
    pub lenient: bool,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the full result to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Export forecast points to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Per-model fit deadline in milliseconds.
    #[arg(long)]
    pub fit_timeout_ms: Option<u64>,

    /// Leave out the Prophet-style candidate even if this build has it.
    #[arg(long)]
    pub no_prophet: bool,
}

/// Options for `demand sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of days to generate.
    #[arg(long, default_value_t = 90)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Mean daily units on the first day.
    #[arg(long, default_value_t = 20.0)]
    pub base: f64,

    /// Change in mean daily units per day.
    #[arg(long, default_value_t = 0.1, allow_hyphen_values = true)]
    pub trend: f64,

    /// Relative size of the weekly cycle, in [0, 1].
    #[arg(long, default_value_t = 0.3)]
    pub weekly_amplitude: f64,

    /// Log-scale noise level.
    #[arg(long, default_value_t = 0.15)]
    pub noise: f64,

    /// Probability that a day has no sales.
    #[arg(long, default_value_t = 0.0)]
    pub zero_prob: f64,

    /// First date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for plotting a saved result.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Result JSON produced by `demand forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::domain::parse_date(s).ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_defaults() {
        let cli = Cli::parse_from(["demand", "forecast", "--input", "sales.csv"]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.product_id, "product");
        assert_eq!(args.horizon, None);
        assert!(args.plot && !args.no_plot);
        assert!(!args.lenient);
    }

    #[test]
    fn forecast_flags_parse() {
        let cli = Cli::parse_from([
            "demand",
            "forecast",
            "-i",
            "s.csv",
            "--horizon",
            "14",
            "--inventory",
            "120",
            "--as-of",
            "2025-03-01",
            "--no-plot",
            "--export-json",
            "out.json",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.horizon, Some(14));
        assert_eq!(args.inventory, Some(120.0));
        assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(args.no_plot);
        assert_eq!(args.export_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn sample_accepts_negative_trend() {
        let cli = Cli::parse_from(["demand", "sample", "--trend", "-0.2", "--out", "s.csv"]);
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.trend, -0.2);
        assert_eq!(args.days, 90);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["demand", "forecast", "-i", "s.csv", "--as-of", "March"]).is_err());
    }
}
