//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then CLI
//! flags (see `app::config_from_args`). The merged result is validated once,
//! before any stage runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CampaignFlag, ScenarioInput};
use crate::error::{AppError, Stage};

/// Label that marks a transaction as "no campaign" in the source data.
pub const DEFAULT_NO_CAMPAIGN_LABEL: &str = "Nenhuma";

/// An evenly spaced candidate axis: `points` values from `min` to `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, points: usize) -> Self {
        Self { min, max, points }
    }

    pub fn validate(&self, name: &str) -> Result<(), AppError> {
        if self.points == 0 {
            return Err(AppError::config(
                Stage::Simulate,
                format!("{name} axis is empty (points = 0)."),
            ));
        }
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(AppError::config(
                Stage::Simulate,
                format!("{name} axis bounds must be finite: min={}, max={}.", self.min, self.max),
            ));
        }
        if self.min > self.max {
            return Err(AppError::config(
                Stage::Simulate,
                format!("{name} axis is inverted: min={} > max={}.", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Everything the simulator needs besides the fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub quantity_axis: AxisSpec,
    pub price_axis: AxisSpec,
    /// Fraction of `quantity × price` assumed to be cost.
    pub cost_ratio: f64,
    /// Campaign regime held fixed across the whole grid.
    pub campaign_flag: CampaignFlag,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quantity_axis: AxisSpec::new(5.0, 30.0, 20),
            price_axis: AxisSpec::new(100.0, 3000.0, 20),
            cost_ratio: 0.6,
            campaign_flag: CampaignFlag::On,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.quantity_axis.validate("quantity")?;
        self.price_axis.validate("price")?;
        if !(self.cost_ratio.is_finite() && (0.0..=1.0).contains(&self.cost_ratio)) {
            return Err(AppError::config(
                Stage::Simulate,
                format!("cost_ratio must be in [0, 1], got {}.", self.cost_ratio),
            ));
        }
        Ok(())
    }
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub test_fraction: f64,
    pub random_seed: u64,
    pub no_campaign_label: String,
    pub simulation: SimulationConfig,
    pub scenarios: Vec<ScenarioInput>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            random_seed: 42,
            no_campaign_label: DEFAULT_NO_CAMPAIGN_LABEL.to_string(),
            simulation: SimulationConfig::default(),
            scenarios: default_scenarios(),
        }
    }
}

impl PipelineConfig {
    /// Read a TOML file; missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::io(Stage::Config, format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::config(Stage::Config, format!("Invalid config TOML: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.test_fraction.is_finite() && self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AppError::config(
                Stage::Config,
                format!("test_fraction must be in (0, 1), got {}.", self.test_fraction),
            ));
        }
        if self.no_campaign_label.trim().is_empty() {
            return Err(AppError::config(Stage::Config, "no_campaign_label must not be empty."));
        }
        self.simulation.validate()
    }
}

/// The what-if points printed after fitting.
pub fn default_scenarios() -> Vec<ScenarioInput> {
    [
        (10.0, 500.0, CampaignFlag::Off),
        (15.0, 1000.0, CampaignFlag::Off),
        (20.0, 1500.0, CampaignFlag::Off),
        (15.0, 1000.0, CampaignFlag::On),
        (20.0, 1500.0, CampaignFlag::On),
    ]
    .into_iter()
    .map(|(quantity, price, campaign)| ScenarioInput {
        quantity,
        price,
        campaign,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.simulation.campaign_flag, CampaignFlag::On);
        assert_eq!(config.scenarios.len(), 5);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = PipelineConfig::from_toml_str(
            r#"
            random_seed = 7

            [simulation]
            cost_ratio = 0.5
            campaign_flag = 0
            quantity_axis = { min = 1.0, max = 10.0, points = 10 }
            price_axis = { min = 10.0, max = 100.0, points = 4 }
            "#,
        )
        .unwrap();

        assert_eq!(config.random_seed, 7);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.simulation.campaign_flag, CampaignFlag::Off);
        assert_eq!(config.simulation.price_axis.points, 4);
    }

    #[test]
    fn rejects_bad_campaign_flag_in_toml() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [simulation]
            cost_ratio = 0.6
            campaign_flag = 3
            quantity_axis = { min = 1.0, max = 10.0, points = 10 }
            price_axis = { min = 10.0, max = 100.0, points = 4 }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = PipelineConfig::default();
        config.test_fraction = 1.0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

        let mut config = PipelineConfig::default();
        config.simulation.cost_ratio = 1.5;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

        let mut config = PipelineConfig::default();
        config.simulation.price_axis = AxisSpec::new(600.0, 100.0, 6);
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);

        let mut config = PipelineConfig::default();
        config.simulation.quantity_axis.points = 0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }
}
