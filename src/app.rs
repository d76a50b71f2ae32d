//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - loads sales CSVs or generates synthetic ones
//! - runs the forecasting pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ForecastArgs, PlotArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sales};
use crate::domain::{EngineConfig, ModelCapabilities};
use crate::error::AppError;
use crate::series::build_daily_series;

pub mod pipeline;

pub use pipeline::{ForecastEngine, ForecastRequest, forecast_demand};

/// Entry point for the `demand` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr so stdout stays clean for reports; `RUST_LOG` overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = engine_config_from_args(&args, EngineConfig::from_env()?)?;
    let capabilities = if args.no_prophet {
        ModelCapabilities::core_only()
    } else {
        ModelCapabilities::detect()
    };

    let ingest = crate::io::ingest::load_sales_csv(&args.input, args.lenient)?;
    info!(
        path = %args.input.display(),
        rows = ingest.rows_read,
        used = ingest.rows_used(),
        "loaded sales history"
    );

    let product_name = args
        .product_name
        .clone()
        .unwrap_or_else(|| args.product_id.clone());
    let mut request = ForecastRequest::new(&args.product_id, product_name, ingest.observations.clone())
        .with_horizon(args.horizon.unwrap_or(config.default_horizon_days));
    if let Some(inv) = args.inventory {
        request = request.with_inventory(inv);
    }
    if let Some(as_of) = args.as_of {
        request = request.with_as_of(as_of);
    }

    let engine = ForecastEngine::new(config, capabilities);
    let result = engine.forecast(&request)?;

    println!("{}", crate::report::format_forecast_summary(&result, Some(&ingest)));

    if args.plot && !args.no_plot {
        let series = build_daily_series(&request.sales_history)?;
        let plot = crate::plot::render_forecast_plot(
            series.values(),
            &result.forecast_points,
            args.width,
            args.height,
        );
        println!("{plot}");
    }

    if let Some(path) = &args.export_json {
        crate::io::export::write_result_json(path, &result)?;
        info!(path = %path.display(), "wrote result JSON");
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_forecast_csv(path, &result)?;
        info!(path = %path.display(), "wrote forecast CSV");
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let defaults = SampleConfig::default();
    let config = SampleConfig {
        days: args.days,
        seed: args.seed,
        start: args.start.unwrap_or(defaults.start),
        base: args.base,
        trend: args.trend,
        weekly_amplitude: args.weekly_amplitude,
        noise: args.noise,
        zero_prob: args.zero_prob,
    };
    let history = generate_sales(&config)?;
    crate::io::export::write_sales_csv(&args.out, &history)?;
    info!(
        path = %args.out.display(),
        days = history.len(),
        seed = config.seed,
        "wrote synthetic sales"
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let result = crate::io::export::read_result_json(&args.result)?;
    println!(
        "{} ({}) | model: {}",
        result.product_name,
        result.product_id,
        result.best_model.display_name()
    );
    println!("{}", crate::plot::render_result_plot(&result, args.width, args.height));
    Ok(())
}

/// Apply CLI overrides on top of the environment-derived config.
pub fn engine_config_from_args(args: &ForecastArgs, mut config: EngineConfig) -> Result<EngineConfig, AppError> {
    if let Some(ms) = args.fit_timeout_ms {
        config.fit_timeout_ms = ms;
    }
    config.validate()?;
    Ok(config)
}
