//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - project records into `X`/`y` (`features`)
//! - partition rows into train/test with a fixed seed (`split`)
//! - fit OLS coefficients (`fitter`)
//! - score the fitted model on held-out rows (`evaluate`)

pub mod evaluate;
pub mod features;
pub mod fitter;
pub mod split;

pub use evaluate::*;
pub use features::*;
pub use fitter::*;
pub use split::*;
