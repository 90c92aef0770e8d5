use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The stage of the simulation a piece of data belongs to.
///
/// Channel impairments are only ever applied in the `Test` phase, and detectors switch their
/// training-only behaviour (dropout) on or off depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Train,
    Test,
}

impl Phase {
    /// Returns the name of the phase as used in resource directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Test => "test",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
