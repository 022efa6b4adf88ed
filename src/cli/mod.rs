//! Command-line parsing for the revenue planner.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rplan", version, about = "Revenue model + price/quantity profit simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the revenue model on a dataset, evaluate it, and simulate the profit grid.
    Run(RunArgs),
    /// Simulate the profit grid from explicit model coefficients (no dataset).
    Simulate(SimulateArgs),
}

/// Options that shape the simulation grid (shared by `run` and `simulate`).
///
/// Every flag is optional: unset flags keep the value from `--config` (or the default).
#[derive(Debug, Args, Clone, Default)]
pub struct GridArgs {
    /// Minimum candidate quantity.
    #[arg(long)]
    pub quantity_min: Option<f64>,

    /// Maximum candidate quantity.
    #[arg(long)]
    pub quantity_max: Option<f64>,

    /// Number of quantity points (inclusive endpoints).
    #[arg(long)]
    pub quantity_points: Option<usize>,

    /// Minimum candidate unit price.
    #[arg(long)]
    pub price_min: Option<f64>,

    /// Maximum candidate unit price.
    #[arg(long)]
    pub price_max: Option<f64>,

    /// Number of price points (inclusive endpoints).
    #[arg(long)]
    pub price_points: Option<usize>,

    /// Fraction of `quantity × price` assumed to be cost.
    #[arg(long)]
    pub cost_ratio: Option<f64>,

    /// Campaign regime held fixed over the grid (0 = none, 1 = active).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub campaign_flag: Option<u8>,

    /// Do not render the ASCII charts (profit heatmap, residual histogram).
    #[arg(long)]
    pub no_plot: bool,

    /// Export the profit grid to CSV.
    #[arg(long = "export-grid", value_name = "CSV")]
    pub export_grid: Option<PathBuf>,
}

/// Options for a full pipeline run.
#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// Sales CSV (`;`-separated, decimal commas).
    #[arg(short = 'f', long = "data", value_name = "CSV", conflicts_with = "synthetic")]
    pub data: Option<PathBuf>,

    /// Use N generated transactions instead of a CSV.
    #[arg(long, value_name = "N")]
    pub synthetic: Option<usize>,

    /// Seed for `--synthetic` generation.
    #[arg(long, default_value_t = 7)]
    pub synthetic_seed: u64,

    /// TOML config file (flags given on the command line take precedence).
    #[arg(short = 'c', long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Held-out fraction for evaluation, in (0, 1).
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Seed for the train/test split.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Campaign label meaning "no campaign".
    #[arg(long)]
    pub no_campaign_label: Option<String>,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Export the full run (config, model, metrics, grid, optimum) to JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,
}

/// Options for simulation from known coefficients.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Coefficients for quantity, unit price and campaign, comma separated.
    #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
    pub coefficients: Vec<f64>,

    /// Model intercept.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub intercept: f64,

    /// TOML config file (only the `[simulation]` table is used).
    #[arg(short = 'c', long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,
}
