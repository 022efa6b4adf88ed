//! Export run results.
//!
//! - the profit grid as long-form CSV (`price,quantity,profit`), easy to pivot in
//!   a spreadsheet or feed to a plotting tool
//! - the whole run (config, model, metrics, optimum) as pretty JSON

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::config::PipelineConfig;
use crate::domain::{EvaluationReport, FittedModel, ScenarioPrediction};
use crate::error::{AppError, Stage};
use crate::io::ingest::DatasetStats;
use crate::simulate::SimulationResult;

/// Write every grid cell as one CSV row, in row-major order.
pub fn write_grid_csv(path: &Path, simulation: &SimulationResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(Stage::Export, format!("Failed to create grid CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["price_index", "quantity_index", "price", "quantity", "profit"])
        .map_err(|e| AppError::io(Stage::Export, format!("Failed to write grid CSV header: {e}")))?;

    let grid = &simulation.grid;
    for (i, price) in grid.price_axis.iter().enumerate() {
        for (j, quantity) in grid.quantity_axis.iter().enumerate() {
            writer
                .write_record([
                    i.to_string(),
                    j.to_string(),
                    format!("{price:.6}"),
                    format!("{quantity:.6}"),
                    format!("{:.6}", grid.get(i, j)),
                ])
                .map_err(|e| AppError::io(Stage::Export, format!("Failed to write grid CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::io(Stage::Export, format!("Failed to flush grid CSV: {e}")))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct RunReportFile<'a> {
    tool: &'static str,
    config: &'a PipelineConfig,
    dataset: &'a DatasetStats,
    train_rows: usize,
    test_rows: usize,
    model: &'a FittedModel,
    evaluation: &'a EvaluationReport,
    scenarios: &'a [ScenarioPrediction],
    simulation: &'a SimulationResult,
}

/// Write the run as JSON.
pub fn write_report_json(path: &Path, run: &RunOutput, config: &PipelineConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(Stage::Export, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let report = RunReportFile {
        tool: "rplan",
        config,
        dataset: &run.ingest.stats,
        train_rows: run.split.indices.train.len(),
        test_rows: run.split.indices.test.len(),
        model: &run.model,
        evaluation: &run.evaluation,
        scenarios: &run.scenarios,
        simulation: &run.simulation,
    };

    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::io(Stage::Export, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}
