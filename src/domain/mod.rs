//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - adapted input rows (`TransactionRecord`)
//! - the fitted model and its diagnostics (`FittedModel`, `EvaluationReport`)
//! - simulation outputs (`OptimalScenario`, `ScenarioPrediction`)

pub mod types;

pub use types::*;
