//! Numeric building blocks: least squares and evenly spaced axes.

pub mod ols;
pub mod space;

pub use ols::*;
pub use space::*;
