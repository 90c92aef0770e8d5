use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    NumericalDivergence {
        epoch: usize,
        loss: f32,
    },
    InvalidSpec(String),
    MissingForwardPass,
    UninitializedDetector,
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}, got {got} and expected {expected}"),
            MlErr::NumericalDivergence { epoch, loss } => {
                write!(f, "training diverged at epoch {epoch}, the loss became {loss}")
            }
            MlErr::InvalidSpec(reason) => write!(f, "invalid specification: {reason}"),
            MlErr::MissingForwardPass => {
                write!(f, "tried to backpropagate without a previous forward pass")
            }
            MlErr::UninitializedDetector => {
                write!(f, "the detector has not been initialized")
            }
        }
    }
}

impl Error for MlErr {}
