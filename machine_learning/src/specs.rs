use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// The optimization algorithm used while training a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        #[serde(default = "default_beta1")]
        beta1: f32,
        #[serde(default = "default_beta2")]
        beta2: f32,
        #[serde(default = "default_epsilon")]
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

fn default_beta1() -> f32 {
    0.9
}

fn default_beta2() -> f32 {
    0.999
}

fn default_epsilon() -> f32 {
    1e-8
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::Adam {
            learning_rate: 1e-3,
            beta1: default_beta1(),
            beta2: default_beta2(),
            epsilon: default_epsilon(),
        }
    }
}

/// How the detector is trained across phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    /// Trained once on the whole training set, then frozen.
    #[default]
    Joint,
    /// Pretrained like `Joint`, then adapted on every test frame.
    Online,
}

/// Where the targets of online adaptation come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// The true transmitted symbols are fed back.
    LabelFeedback,
    /// The detector's own hard decisions are used as labels.
    #[default]
    SelfSupervised,
}

/// The specification for a `DetectorTrainer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerSpec {
    #[serde(default)]
    pub mode: TrainingMode,
    #[serde(default)]
    pub label_source: LabelSource,
    #[serde(default)]
    pub optimizer: OptimizerSpec,
    pub max_epochs: usize,
    #[serde(default = "default_online_epochs")]
    pub online_epochs: usize,
    #[serde(default)]
    pub early_stop_loss: Option<f32>,
}

fn default_online_epochs() -> usize {
    5
}

/// The specification for a `DeepRx` detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSpec {
    /// The width of each hidden layer.
    #[serde(default = "default_hidden")]
    pub hidden: Vec<NonZeroUsize>,
    /// The dropout rate applied after the first hidden layer while training.
    #[serde(default)]
    pub dropout: f32,
}

fn default_hidden() -> Vec<NonZeroUsize> {
    [32, 16].into_iter().filter_map(NonZeroUsize::new).collect()
}

impl Default for DetectorSpec {
    fn default() -> Self {
        Self {
            hidden: default_hidden(),
            dropout: 0.,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainer_spec_fills_defaults() {
        let spec: TrainerSpec = serde_json::from_str(r#"{ "max_epochs": 100 }"#).unwrap();

        assert_eq!(spec.mode, TrainingMode::Joint);
        assert_eq!(spec.label_source, LabelSource::SelfSupervised);
        assert_eq!(spec.optimizer, OptimizerSpec::default());
        assert_eq!(spec.online_epochs, 5);
        assert!(spec.early_stop_loss.is_none());
    }

    #[test]
    fn optimizers_are_tagged_in_snake_case() {
        let json = r#"{
            "mode": "online",
            "label_source": "label_feedback",
            "optimizer": { "gradient_descent": { "learning_rate": 0.1 } },
            "max_epochs": 10,
            "online_epochs": 2,
            "early_stop_loss": 0.01
        }"#;
        let spec: TrainerSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.mode, TrainingMode::Online);
        assert_eq!(spec.label_source, LabelSource::LabelFeedback);
        assert_eq!(
            spec.optimizer,
            OptimizerSpec::GradientDescent { learning_rate: 0.1 }
        );
        assert_eq!(spec.early_stop_loss, Some(0.01));
    }

    #[test]
    fn adam_hyperparameters_default() {
        let spec: OptimizerSpec =
            serde_json::from_str(r#"{ "adam": { "learning_rate": 0.01 } }"#).unwrap();

        assert_eq!(
            spec,
            OptimizerSpec::Adam {
                learning_rate: 0.01,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-8
            }
        );
    }

    #[test]
    fn detector_rejects_empty_layers() {
        assert!(serde_json::from_str::<DetectorSpec>(r#"{ "hidden": [8, 0] }"#).is_err());

        let spec: DetectorSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.hidden.len(), 2);
    }
}
