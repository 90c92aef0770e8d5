use std::{num::NonZeroUsize, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::ChannelVariant;

/// The default directory holding the empirical channel traces.
pub const DEFAULT_TRACE_ROOT: &str = "resources";

/// The specification for the `ChannelModel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub variant: ChannelVariant,
    pub n_ant: NonZeroUsize,
    pub n_user: NonZeroUsize,
    #[serde(default)]
    pub csi_noise: f32,
    #[serde(default)]
    pub fading: bool,
    #[serde(default)]
    pub trace_root: Option<PathBuf>,
}

impl ChannelSpec {
    /// Returns the directory the empirical traces are read from.
    pub fn trace_root(&self) -> PathBuf {
        self.trace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRACE_ROOT))
    }
}

/// The specification for the data generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    pub frame_size: NonZeroUsize,
    pub train_frame_num: NonZeroUsize,
    pub test_frame_num: NonZeroUsize,
    pub snr_db: f32,
}

impl DataSpec {
    /// The amount of samples generated for training.
    pub fn train_size(&self) -> usize {
        self.train_frame_num.get() * self.frame_size.get()
    }

    /// The amount of samples generated for testing.
    pub fn test_size(&self) -> usize {
        self.test_frame_num.get() * self.frame_size.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_spec_defaults_impairments_off() {
        let spec: ChannelSpec =
            serde_json::from_str(r#"{"variant": "SED", "n_ant": 4, "n_user": 2}"#).unwrap();

        assert_eq!(spec.variant, ChannelVariant::SpatialExponentialDecay);
        assert_eq!(spec.csi_noise, 0.0);
        assert!(!spec.fading);
        assert_eq!(spec.trace_root(), PathBuf::from(DEFAULT_TRACE_ROOT));
    }

    #[test]
    fn channel_spec_rejects_unknown_variant() {
        let res = serde_json::from_str::<ChannelSpec>(
            r#"{"variant": "Rayleigh", "n_ant": 4, "n_user": 2}"#,
        );

        let err = res.unwrap_err().to_string();
        assert!(err.contains("Rayleigh"), "{err}");
    }

    #[test]
    fn data_spec_sizes() {
        let spec: DataSpec = serde_json::from_str(
            r#"{"frame_size": 100, "train_frame_num": 3, "test_frame_num": 5, "snr_db": 10.0}"#,
        )
        .unwrap();

        assert_eq!(spec.train_size(), 300);
        assert_eq!(spec.test_size(), 500);
    }
}
