//! Signal detectors for multi-user MIMO channels and the loops that train them.

pub mod arch;
pub mod error;
pub mod optimization;
pub mod specs;
pub mod training;

pub use error::{MlErr, Result};
