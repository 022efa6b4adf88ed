//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and simulation
//! - exported to JSON/CSV
//! - rendered by the report/plot layers without touching the numeric core

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Stage};

/// Number of regression features (excluding the intercept).
pub const FEATURE_COUNT: usize = 3;

/// Regression features, in design-matrix column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Quantity,
    UnitPrice,
    Campaign,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [Feature::Quantity, Feature::UnitPrice, Feature::Campaign];

    /// Column index in the feature matrix.
    pub fn index(self) -> usize {
        match self {
            Feature::Quantity => 0,
            Feature::UnitPrice => 1,
            Feature::Campaign => 2,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::Quantity => "quantity",
            Feature::UnitPrice => "unit price",
            Feature::Campaign => "campaign",
        }
    }
}

/// Binary campaign indicator.
///
/// Serialized as `0` / `1` so config files read the same as the dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CampaignFlag {
    Off,
    #[default]
    On,
}

impl CampaignFlag {
    pub fn as_f64(self) -> f64 {
        match self {
            CampaignFlag::Off => 0.0,
            CampaignFlag::On => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CampaignFlag::Off => "no",
            CampaignFlag::On => "yes",
        }
    }
}

impl TryFrom<u8> for CampaignFlag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CampaignFlag::Off),
            1 => Ok(CampaignFlag::On),
            other => Err(format!("campaign flag must be 0 or 1, got {other}")),
        }
    }
}

impl From<CampaignFlag> for u8 {
    fn from(value: CampaignFlag) -> Self {
        match value {
            CampaignFlag::Off => 0,
            CampaignFlag::On => 1,
        }
    }
}

/// One adapted row of the sales table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub sale_date: Option<NaiveDate>,
    pub quantity: u32,
    pub unit_price: f64,
    /// Amount actually charged (≈ quantity × unit price when no discount applies).
    pub total_value: f64,
    pub total_cost: Option<f64>,
    pub campaign: String,
    /// Derived from `campaign` against the configured "no campaign" label.
    pub has_campaign: bool,
    pub satisfaction: Option<f64>,
    pub channel: Option<String>,
    pub region: Option<String>,
}

impl TransactionRecord {
    /// `lucro`: total value minus total cost.
    pub fn profit(&self) -> Option<f64> {
        self.total_cost.map(|cost| self.total_value - cost)
    }

    /// `margem_lucro`: profit as a percentage of total value.
    pub fn margin_pct(&self) -> Option<f64> {
        let profit = self.profit()?;
        if self.total_value == 0.0 {
            return None;
        }
        Some(profit / self.total_value * 100.0)
    }

    pub fn campaign_flag(&self) -> CampaignFlag {
        if self.has_campaign {
            CampaignFlag::On
        } else {
            CampaignFlag::Off
        }
    }
}

/// Ordinary least squares fit: one weight per [`Feature`] plus an intercept.
///
/// Created once per run by the fitter; the evaluator and the simulator borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl FittedModel {
    pub fn new(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Build a model from a solver vector laid out as `[intercept, β_1, .., β_p]`.
    pub fn from_solution(solution: &[f64]) -> Result<Self, AppError> {
        if solution.len() != FEATURE_COUNT + 1 {
            return Err(AppError::internal(
                Stage::Fit,
                format!(
                    "solver returned {} parameters, expected {} (intercept + {FEATURE_COUNT} features)",
                    solution.len(),
                    FEATURE_COUNT + 1
                ),
            ));
        }
        let mut coefficients = [0.0; FEATURE_COUNT];
        coefficients.copy_from_slice(&solution[1..]);
        Ok(Self::new(coefficients, solution[0]))
    }

    pub fn coefficient(&self, feature: Feature) -> f64 {
        self.coefficients[feature.index()]
    }

    /// Predict revenue for one feature row.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut y = self.intercept;
        for (beta, x) in self.coefficients.iter().zip(row.iter()) {
            y += beta * x;
        }
        y
    }

    pub fn predict_point(&self, quantity: f64, unit_price: f64, campaign: CampaignFlag) -> f64 {
        self.predict(&[quantity, unit_price, campaign.as_f64()])
    }
}

/// Coefficient of determination; undefined when the targets have zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum RSquared {
    Defined(f64),
    Undefined,
}

impl RSquared {
    pub fn value(self) -> Option<f64> {
        match self {
            RSquared::Defined(v) => Some(v),
            RSquared::Undefined => None,
        }
    }
}

/// Out-of-sample diagnostics for a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub r2: RSquared,
    pub mae: f64,
    pub rmse: f64,
    /// `y - ŷ`, one per test row, in test-partition order.
    pub residuals: Vec<f64>,
    pub predictions: Vec<f64>,
}

/// Best cell of the profit grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalScenario {
    pub price_index: usize,
    pub quantity_index: usize,
    pub quantity: f64,
    pub price: f64,
    pub predicted_revenue: f64,
    pub predicted_profit: f64,
}

/// A what-if point to push through the fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub campaign: CampaignFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPrediction {
    pub input: ScenarioInput,
    pub predicted_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_matches_linear_formula() {
        let model = FittedModel::new([50.0, 0.5, 100.0], 10.0);
        let y = model.predict_point(5.0, 100.0, CampaignFlag::On);
        assert_eq!(y, 10.0 + 250.0 + 50.0 + 100.0);
        assert_eq!(model.coefficient(Feature::UnitPrice), 0.5);
    }

    #[test]
    fn from_solution_rejects_wrong_length() {
        let err = FittedModel::from_solution(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);

        let model = FittedModel::from_solution(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(model.intercept, 1.0);
        assert_eq!(model.coefficients, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn campaign_flag_round_trips_through_u8() {
        assert_eq!(CampaignFlag::try_from(0).unwrap(), CampaignFlag::Off);
        assert_eq!(u8::from(CampaignFlag::On), 1);
        assert!(CampaignFlag::try_from(2).is_err());
    }

    #[test]
    fn profit_and_margin_follow_cost() {
        let record = TransactionRecord {
            sale_date: None,
            quantity: 2,
            unit_price: 50.0,
            total_value: 100.0,
            total_cost: Some(60.0),
            campaign: "Nenhuma".to_string(),
            has_campaign: false,
            satisfaction: None,
            channel: None,
            region: None,
        };
        assert_eq!(record.profit(), Some(40.0));
        assert_eq!(record.margin_pct(), Some(40.0));
        assert_eq!(record.campaign_flag(), CampaignFlag::Off);
    }
}
