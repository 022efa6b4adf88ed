//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - layers config (defaults, TOML file, flags)
//! - runs the fit/evaluate/simulate pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, GridArgs, RunArgs, SimulateArgs};
use crate::config::{PipelineConfig, SimulationConfig};
use crate::domain::{CampaignFlag, FEATURE_COUNT, FittedModel};
use crate::error::{AppError, Stage};

pub mod pipeline;

use pipeline::DataSource;

/// Width of one heatmap cell in characters.
const HEATMAP_CELL_WIDTH: usize = 3;

const RESIDUAL_BINS: usize = 12;
const RESIDUAL_BAR_WIDTH: usize = 40;

/// Entry point for the `rplan` binary.
pub fn run() -> Result<(), AppError> {
    // `rplan --data x.csv` behaves like `rplan run --data x.csv`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args)?;
    let source = data_source_from_args(&args)?;
    let run = pipeline::run_pipeline(&config, &source)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    if !args.grid.no_plot {
        println!(
            "{}",
            crate::plot::render_profit_heatmap(&run.simulation, HEATMAP_CELL_WIDTH)
        );
        println!(
            "{}",
            crate::plot::render_residual_histogram(
                &run.evaluation.residuals,
                RESIDUAL_BINS,
                RESIDUAL_BAR_WIDTH
            )
        );
    }

    if let Some(path) = &args.grid.export_grid {
        crate::io::export::write_grid_csv(path, &run.simulation)?;
        info!(path = %path.display(), "grid exported");
    }
    if let Some(path) = &args.export_report {
        crate::io::export::write_report_json(path, &run, &config)?;
        info!(path = %path.display(), "report exported");
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let model = model_from_args(&args)?;
    let mut simulation_config = match &args.config {
        Some(path) => load_config_file(path)?.simulation,
        None => SimulationConfig::default(),
    };
    apply_grid_overrides(&mut simulation_config, &args.grid)?;

    let simulation = crate::simulate::simulate(&model, &simulation_config)?;

    println!("Model:\n{}", crate::report::format_model(&model));
    println!("{}", crate::report::format_simulation(&simulation));
    if !args.grid.no_plot {
        println!(
            "{}",
            crate::plot::render_profit_heatmap(&simulation, HEATMAP_CELL_WIDTH)
        );
    }

    if let Some(path) = &args.grid.export_grid {
        crate::io::export::write_grid_csv(path, &simulation)?;
        info!(path = %path.display(), "grid exported");
    }

    Ok(())
}

/// Build the validated pipeline config: defaults, then `--config`, then flags.
pub fn pipeline_config_from_args(args: &RunArgs) -> Result<PipelineConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(f) = args.test_fraction {
        config.test_fraction = f;
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if let Some(label) = &args.no_campaign_label {
        config.no_campaign_label = label.clone();
    }
    apply_grid_overrides(&mut config.simulation, &args.grid)?;

    config.validate()?;
    Ok(config)
}

pub fn data_source_from_args(args: &RunArgs) -> Result<DataSource, AppError> {
    match (&args.data, args.synthetic) {
        (Some(path), _) => Ok(DataSource::Csv(path.clone())),
        (None, Some(count)) => Ok(DataSource::Synthetic {
            count,
            seed: args.synthetic_seed,
        }),
        (None, None) => Err(AppError::config(
            Stage::Config,
            "No data source: pass --data <CSV> or --synthetic <N>.",
        )),
    }
}

fn model_from_args(args: &SimulateArgs) -> Result<FittedModel, AppError> {
    let coefficients: [f64; FEATURE_COUNT] = args.coefficients.as_slice().try_into().map_err(|_| {
        AppError::config(
            Stage::Config,
            format!(
                "Expected {FEATURE_COUNT} coefficients (quantity, price, campaign), got {}.",
                args.coefficients.len()
            ),
        )
    })?;
    if coefficients.iter().chain(std::iter::once(&args.intercept)).any(|v| !v.is_finite()) {
        return Err(AppError::config(Stage::Config, "Model coefficients must be finite."));
    }
    Ok(FittedModel::new(coefficients, args.intercept))
}

fn apply_grid_overrides(config: &mut SimulationConfig, grid: &GridArgs) -> Result<(), AppError> {
    if let Some(v) = grid.quantity_min {
        config.quantity_axis.min = v;
    }
    if let Some(v) = grid.quantity_max {
        config.quantity_axis.max = v;
    }
    if let Some(v) = grid.quantity_points {
        config.quantity_axis.points = v;
    }
    if let Some(v) = grid.price_min {
        config.price_axis.min = v;
    }
    if let Some(v) = grid.price_max {
        config.price_axis.max = v;
    }
    if let Some(v) = grid.price_points {
        config.price_axis.points = v;
    }
    if let Some(v) = grid.cost_ratio {
        config.cost_ratio = v;
    }
    if let Some(v) = grid.campaign_flag {
        config.campaign_flag =
            CampaignFlag::try_from(v).map_err(|e| AppError::config(Stage::Config, e))?;
    }
    config.validate()
}

fn load_config_file(path: &Path) -> Result<PipelineConfig, AppError> {
    let config = PipelineConfig::from_toml_file(path)?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Rewrite argv so `rplan` defaults to `rplan run`.
///
/// Rules:
/// - `rplan`                      -> `rplan run`
/// - `rplan --data x.csv ...`     -> `rplan run --data x.csv ...`
/// - `rplan --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "simulate");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
