use std::fmt::{self, Display};

use channel::{ChannelModel, DataGenerator, Phase, symbols::symbols_to_bits};
use log::{debug, info};
use machine_learning::{
    specs::TrainingMode,
    training::{TrainerBuilder, decide_bits},
};
use ndarray::{ArrayView2, Zip};
use rand::{SeedableRng, rngs::StdRng};

use crate::SimulationSpec;

/// The outcome of a simulation.
#[derive(Debug, Clone)]
pub struct Report {
    pub detector: String,
    /// The loss of every training step taken before testing.
    pub train_losses: Vec<f32>,
    /// The bit error rate of every test frame, in order.
    pub frame_bers: Vec<f32>,
}

impl Report {
    pub fn mean_ber(&self) -> f32 {
        if self.frame_bers.is_empty() {
            return 0.;
        }

        self.frame_bers.iter().sum::<f32>() / self.frame_bers.len() as f32
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: mean ber {:.5} over {} frames",
            self.detector,
            self.mean_ber(),
            self.frame_bers.len()
        )
    }
}

/// The fraction of bits wrongly detected out of the logits of a detector.
pub fn bit_error_rate(symbols: ArrayView2<f32>, logits: ArrayView2<f32>) -> f32 {
    if symbols.is_empty() {
        return 0.;
    }

    let bits = symbols_to_bits(symbols);
    let decided = decide_bits(logits);
    let errors = Zip::from(&bits)
        .and(&decided)
        .fold(0usize, |acc, a, b| acc + usize::from(a != b));

    errors as f32 / symbols.len() as f32
}

/// Runs a whole simulation: trains a detector over the training phase's channel, then measures
/// it frame by frame over the test phase's, adapting it on every frame in online mode.
pub struct Evaluator {
    spec: SimulationSpec,
    rng: StdRng,
}

impl Evaluator {
    pub fn new(spec: SimulationSpec) -> Self {
        let rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { spec, rng }
    }

    pub fn run(&mut self) -> anyhow::Result<Report> {
        let SimulationSpec {
            seed,
            channel,
            data,
            trainer: trainer_spec,
            detector,
        } = &self.spec;

        let frame_size = data.frame_size;
        let generator = DataGenerator::new(ChannelModel::new(channel.clone()), frame_size);
        let mut trainer = TrainerBuilder::new().build(
            trainer_spec,
            detector,
            channel,
            frame_size.get(),
            *seed,
        );
        trainer.initialize_detector()?;

        let (x, y) = generator.generate(data.train_size(), Phase::Train, data.snr_db, &mut self.rng)?;
        let train_losses =
            trainer.train_loop(x.view(), y.view(), trainer_spec.max_epochs, Phase::Train)?;
        info!(
            epochs = train_losses.len(),
            loss = train_losses.last().copied().unwrap_or(f32::NAN);
            "trained {trainer}"
        );

        let frames =
            generator.generate_frames(data.test_size(), Phase::Test, data.snr_db, &mut self.rng)?;
        let mut frame_bers = Vec::with_capacity(frames.len());

        for (i, frame) in frames.iter().enumerate() {
            let logits = trainer.predict(frame.observations.view())?;
            let ber = bit_error_rate(frame.symbols.view(), logits.view());
            debug!(frame = i, ber = ber; "evaluated frame");
            frame_bers.push(ber);

            if trainer_spec.mode == TrainingMode::Online {
                trainer.train_loop(
                    frame.symbols.view(),
                    frame.observations.view(),
                    trainer_spec.online_epochs,
                    Phase::Test,
                )?;
            }
        }

        let report = Report {
            detector: trainer.to_string(),
            train_losses,
            frame_bers,
        };
        info!(frames = report.frame_bers.len(), ber = report.mean_ber(); "evaluated {trainer}");

        Ok(report)
    }
}
