//! Scenario simulation over the fitted model.
//!
//! - evaluate simulated profit over a quantity × price grid (`grid`)
//! - pick the profit-maximizing operating point (`grid::find_optimum`)
//! - push what-if points through the model (`scenarios`)

pub mod grid;
pub mod scenarios;

pub use grid::*;
pub use scenarios::*;
