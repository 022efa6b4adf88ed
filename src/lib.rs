//! `revenue-planner` library crate.
//!
//! The binary (`rplan`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit/simulate pipeline is reusable from other front ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod simulate;
