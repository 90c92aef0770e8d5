mod builder;
mod decision;
mod trainer;

pub use builder::{DeepRxTrainer, TrainerBuilder};
pub use decision::{decide_bits, decide_symbols};
pub use trainer::{DetectorTrainer, TrainerState, train_detector};
