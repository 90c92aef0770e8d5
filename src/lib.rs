//! Trains signal detectors over simulated multi-user MIMO channels and measures their bit
//! error rate.

pub mod config;
pub mod evaluation;

pub use config::SimulationSpec;
pub use evaluation::{Evaluator, Report, bit_error_rate};
