//! Formatted terminal output for runs and simulations.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::config::PipelineConfig;
use crate::domain::{EvaluationReport, Feature, FittedModel, OptimalScenario, RSquared, ScenarioPrediction};
use crate::io::ingest::DatasetStats;
use crate::simulate::SimulationResult;

/// Format the full run summary (dataset + fit diagnostics + what-ifs + optimum).
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== rplan - Revenue Model & Profit Simulation ===\n");
    out.push_str(&format_dataset(&run.ingest.stats));
    if !run.ingest.row_errors.is_empty() {
        out.push_str(&format!(
            "Rows: read={} used={} rejected={}\n",
            run.ingest.rows_read,
            run.ingest.rows_used,
            run.ingest.row_errors.len()
        ));
    }
    out.push_str(&format!(
        "Split: train={} test={} (test_fraction={:.2}, seed={})\n",
        run.split.train.len(),
        run.split.test.len(),
        config.test_fraction,
        config.random_seed,
    ));

    out.push_str("\nModel:\n");
    out.push_str(&format_model(&run.model));

    out.push_str("\nHeld-out metrics:\n");
    out.push_str(&format_metrics(&run.evaluation));

    out.push_str("\nWhat-if predictions:\n");
    out.push_str(&format_scenarios(&run.scenarios));

    out.push('\n');
    out.push_str(&format_simulation(&run.simulation));

    out
}

/// Format the simulation assumptions and the chosen operating point.
pub fn format_simulation(simulation: &SimulationResult) -> String {
    let mut out = String::new();
    let (rows, cols) = simulation.grid.shape();

    out.push_str(&format!(
        "Simulation: grid={rows}x{cols} (price x quantity) | cost_ratio={:.2} | campaign={}\n",
        simulation.cost_ratio,
        simulation.campaign_flag.label(),
    ));
    out.push_str(&format_optimum(&simulation.optimum));
    out
}

pub fn format_model(model: &FittedModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("- {:<12} {:>14.6}\n", "intercept", model.intercept));
    for feature in Feature::ALL {
        out.push_str(&format!(
            "- {:<12} {:>14.6}\n",
            feature.display_name(),
            model.coefficient(feature)
        ));
    }
    out
}

pub fn format_metrics(evaluation: &EvaluationReport) -> String {
    format!(
        "R2={} MAE={:.2} RMSE={:.2} (n={})\n",
        fmt_r2(evaluation.r2),
        evaluation.mae,
        evaluation.rmse,
        evaluation.predictions.len(),
    )
}

pub fn format_scenarios(scenarios: &[ScenarioPrediction]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>10} {:>12} {:>9} {:>16}\n", "quantity", "price", "campaign", "revenue"));
    out.push_str(&format!("{:->10} {:->12} {:->9} {:->16}\n", "", "", "", ""));
    for s in scenarios {
        out.push_str(&format!(
            "{:>10.2} {:>12.2} {:>9} {:>16.2}\n",
            s.input.quantity,
            s.input.price,
            s.input.campaign.label(),
            s.predicted_revenue,
        ));
    }
    out
}

fn format_dataset(stats: &DatasetStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Records: n={} | campaign share={:.1}%\n",
        stats.n_records,
        stats.campaign_share * 100.0
    ));
    if let (Some(first), Some(last)) = (stats.first_sale, stats.last_sale) {
        out.push_str(&format!("Period: {first} .. {last}\n"));
    }
    out.push_str(&format!("Current revenue: {:.2}\n", stats.total_revenue));
    if let Some(profit) = stats.total_profit {
        out.push_str(&format!("Current profit : {profit:.2}\n"));
    }
    if let Some(margin) = stats.mean_margin_pct {
        out.push_str(&format!("Mean margin    : {margin:.2}%\n"));
    }
    if let Some(satisfaction) = stats.mean_satisfaction {
        out.push_str(&format!("Mean satisfaction: {satisfaction:.2}\n"));
    }
    out
}

fn format_optimum(optimum: &OptimalScenario) -> String {
    format!(
        "Optimal scenario: quantity={:.2} price={:.2} -> revenue={:.2} profit={:.2}\n",
        optimum.quantity, optimum.price, optimum.predicted_revenue, optimum.predicted_profit,
    )
}

fn fmt_r2(r2: RSquared) -> String {
    match r2 {
        RSquared::Defined(v) => format!("{v:.4}"),
        RSquared::Undefined => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisSpec, SimulationConfig};
    use crate::domain::CampaignFlag;
    use crate::simulate::simulate;

    #[test]
    fn model_block_lists_intercept_then_features() {
        let txt = format_model(&FittedModel::new([50.0, 0.8, 120.0], 10.0));
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("- intercept"));
        assert!(lines[0].ends_with("10.000000"));
        assert!(lines[3].ends_with("120.000000"));
    }

    #[test]
    fn undefined_r2_is_spelled_out() {
        let report = EvaluationReport {
            r2: RSquared::Undefined,
            mae: 1.5,
            rmse: 2.0,
            residuals: vec![1.0, -2.0],
            predictions: vec![3.0, 4.0],
        };
        assert_eq!(format_metrics(&report), "R2=undefined MAE=1.50 RMSE=2.00 (n=2)\n");
    }

    #[test]
    fn simulation_block_reports_optimum() {
        let model = FittedModel::new([50.0, 0.5, 100.0], 10.0);
        let config = SimulationConfig {
            quantity_axis: AxisSpec::new(5.0, 30.0, 6),
            price_axis: AxisSpec::new(100.0, 600.0, 6),
            cost_ratio: 0.6,
            campaign_flag: CampaignFlag::On,
        };
        let txt = format_simulation(&simulate(&model, &config).unwrap());
        assert!(txt.starts_with("Simulation: grid=6x6"));
        assert!(txt.contains("quantity=5.00 price=100.00 -> revenue=410.00 profit=110.00"));
    }
}
