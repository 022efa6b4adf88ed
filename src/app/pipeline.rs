//! Shared pipeline logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> build features -> split -> fit -> {evaluate, simulate}
//!
//! The stages run strictly in that order; the first failure aborts the run.
//! The fitted model is owned here and lent immutably to both the evaluator and
//! the simulator, so both see the same coefficients.

use std::path::PathBuf;

use tracing::info;

use crate::config::PipelineConfig;
use crate::data::{SampleSpec, generate_transactions};
use crate::domain::{EvaluationReport, FittedModel, ScenarioPrediction};
use crate::error::AppError;
use crate::fit::{FeatureSet, TrainTestSplit, build_features, evaluate, fit_linear_model, train_test_split};
use crate::io::ingest::{IngestedData, load_transactions};
use crate::simulate::{SimulationResult, predict_scenarios, simulate};

/// Where the transactions come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic { count: usize, seed: u64 },
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub features: FeatureSet,
    pub split: TrainTestSplit,
    pub model: FittedModel,
    pub evaluation: EvaluationReport,
    pub scenarios: Vec<ScenarioPrediction>,
    pub simulation: SimulationResult,
}

/// Load the data and execute the full pipeline.
pub fn run_pipeline(config: &PipelineConfig, source: &DataSource) -> Result<RunOutput, AppError> {
    config.validate()?;
    let ingest = load(config, source)?;
    run_with_data(config, ingest)
}

/// Load transactions from the configured source.
pub fn load(config: &PipelineConfig, source: &DataSource) -> Result<IngestedData, AppError> {
    match source {
        DataSource::Csv(path) => load_transactions(path, &config.no_campaign_label),
        DataSource::Synthetic { count, seed } => {
            let records = generate_transactions(&SampleSpec::new(*count, *seed))?;
            info!(count, seed, "generated synthetic transactions");
            IngestedData::from_records(records)
        }
    }
}

/// Execute every stage after loading.
pub fn run_with_data(config: &PipelineConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    config.validate()?;

    let features = build_features(&ingest.records)?;
    info!(rows = features.len(), "features built");

    let split = train_test_split(&features, config.test_fraction, config.random_seed)?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        seed = config.random_seed,
        "train/test split"
    );

    let model = fit_linear_model(&split.train)?;
    info!(
        intercept = model.intercept,
        coefficients = ?model.coefficients,
        "model fitted"
    );

    let evaluation = evaluate(&model, &split.test)?;
    info!(
        r2 = ?evaluation.r2.value(),
        mae = evaluation.mae,
        rmse = evaluation.rmse,
        "model evaluated on held-out rows"
    );

    let scenarios = predict_scenarios(&model, &config.scenarios);

    let simulation = simulate(&model, &config.simulation)?;
    info!(
        quantity = simulation.optimum.quantity,
        price = simulation.optimum.price,
        profit = simulation.optimum.predicted_profit,
        "optimal scenario selected"
    );

    Ok(RunOutput {
        ingest,
        features,
        split,
        model,
        evaluation,
        scenarios,
        simulation,
    })
}
