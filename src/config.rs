use std::{fs, path::Path};

use anyhow::{Context, ensure};
use channel::{ChannelSpec, DataSpec};
use machine_learning::specs::{DetectorSpec, TrainerSpec};
use serde::{Deserialize, Serialize};

/// The configuration used when none is given.
const BUNDLED_CONFIG: &str = include_str!("../configs/sed.json");

/// The whole configuration of a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSpec {
    /// Seeds every random number generator, a random seed is used if missing.
    #[serde(default)]
    pub seed: Option<u64>,
    pub channel: ChannelSpec,
    pub data: DataSpec,
    pub trainer: TrainerSpec,
    #[serde(default)]
    pub detector: DetectorSpec,
}

impl SimulationSpec {
    /// Reads a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;

        Self::from_json(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// The configuration shipped with the binary.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json(BUNDLED_CONFIG).context("invalid bundled config")
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.data.snr_db.is_finite(), "the snr must be finite");
        ensure!(
            self.channel.csi_noise >= 0.,
            "the csi noise must not be negative, got {}",
            self.channel.csi_noise
        );
        ensure!(
            (0.0..1.0).contains(&self.detector.dropout),
            "the dropout rate must be in [0, 1), got {}",
            self.detector.dropout
        );

        Ok(())
    }
}
