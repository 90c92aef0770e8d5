use channel::ChannelSpec;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::DetectorTrainer;
use crate::{
    Result,
    arch::DeepRx,
    specs::{DetectorSpec, TrainerSpec},
};

/// A `DetectorTrainer` training `DeepRx` detectors.
pub type DeepRxTrainer = DetectorTrainer<DeepRx, Box<dyn FnMut(usize) -> Result<DeepRx>>>;

/// Builds `DetectorTrainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new uninitialized `DeepRxTrainer` following a spec.
    ///
    /// # Arguments
    /// * `trainer` - The specification for the trainer.
    /// * `detector` - The specification for the detectors it builds.
    /// * `channel` - The channel the detectors receive through.
    /// * `frame_size` - The amount of symbols per frame.
    /// * `seed` - The seed for the detectors' parameters, random if missing.
    pub fn build(
        &self,
        trainer: &TrainerSpec,
        detector: &DetectorSpec,
        channel: &ChannelSpec,
        frame_size: usize,
        seed: Option<u64>,
    ) -> DeepRxTrainer {
        let mut rng = self.generate_rng(seed);
        let detector = detector.clone();
        let (n_ant, n_user) = (channel.n_ant.get(), channel.n_user.get());

        let factory: Box<dyn FnMut(usize) -> Result<DeepRx>> = Box::new(move |frame_size| {
            let rng = StdRng::seed_from_u64(rng.random());
            DeepRx::new(&detector, n_ant, n_user, frame_size, rng)
        });

        DetectorTrainer::new(trainer.clone(), frame_size, factory)
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
