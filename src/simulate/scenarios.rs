//! What-if predictions for hand-picked operating points.

use crate::domain::{FittedModel, ScenarioInput, ScenarioPrediction};

pub fn predict_scenarios(model: &FittedModel, scenarios: &[ScenarioInput]) -> Vec<ScenarioPrediction> {
    scenarios
        .iter()
        .map(|s| ScenarioPrediction {
            input: *s,
            predicted_revenue: model.predict_point(s.quantity, s.price, s.campaign),
        })
        .collect()
}
