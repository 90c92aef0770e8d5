use std::fmt::{self, Display};

use channel::{Phase, symbols::symbols_to_bits};
use log::{debug, info, trace};
use ndarray::{Array2, ArrayView2, Axis};

use super::decide_symbols;
use crate::{
    MlErr, Result,
    arch::{
        Detector,
        loss::{Bce, LossFn},
    },
    optimization::build_optimizer,
    specs::{LabelSource, TrainerSpec, TrainingMode},
};

/// The lifecycle of a `DetectorTrainer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Uninitialized,
    Train,
    Test,
}

/// Owns a detector and drives its training and inference.
///
/// The detector is built lazily by `factory` out of the frame size, so a trainer can be
/// configured before the dimensions of the data are known to hold.
pub struct DetectorTrainer<D, F>
where
    D: Detector,
    F: FnMut(usize) -> Result<D>,
{
    spec: TrainerSpec,
    factory: F,
    frame_size: usize,
    detector: Option<D>,
    state: TrainerState,
}

impl<D, F> DetectorTrainer<D, F>
where
    D: Detector,
    F: FnMut(usize) -> Result<D>,
{
    /// Creates a new uninitialized `DetectorTrainer`.
    ///
    /// # Arguments
    /// * `spec` - The training configuration.
    /// * `frame_size` - The amount of symbols per frame, online adaptation runs frame by frame.
    /// * `factory` - Builds the detector out of the frame size.
    pub fn new(spec: TrainerSpec, frame_size: usize, factory: F) -> Self {
        Self {
            spec,
            factory,
            frame_size,
            detector: None,
            state: TrainerState::Uninitialized,
        }
    }

    pub fn spec(&self) -> &TrainerSpec {
        &self.spec
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn detector(&self) -> Option<&D> {
        self.detector.as_ref()
    }

    /// Builds a fresh detector, dropping the previous one if any.
    pub fn initialize_detector(&mut self) -> Result<()> {
        if self.frame_size == 0 {
            return Err(MlErr::InvalidSpec("the frame size must not be zero".into()));
        }

        let detector = (self.factory)(self.frame_size)?;
        info!(params = detector.parameters().len(); "initialized {}", detector.name());

        self.detector = Some(detector);
        self.state = TrainerState::Train;
        Ok(())
    }

    /// Trains the detector for `max_epochs` full batch steps.
    ///
    /// # Arguments
    /// * `x` - The transmitted symbols, the targets.
    /// * `y` - The received observations, the inputs.
    /// * `max_epochs` - The maximum amount of steps to take.
    ///
    /// # Returns
    /// The loss of every step taken or an error if training failed.
    pub fn train_model(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        max_epochs: usize,
    ) -> Result<Vec<f32>> {
        let detector = self.detector.as_mut().ok_or(MlErr::UninitializedDetector)?;
        self.state = TrainerState::Train;
        train_detector(detector, &self.spec, x, y, max_epochs)
    }

    /// Runs the detector in evaluation mode over `y`.
    ///
    /// # Returns
    /// The raw outputs, one logit per user.
    pub fn predict(&mut self, y: ArrayView2<f32>) -> Result<Array2<f32>> {
        let detector = self.detector.as_mut().ok_or(MlErr::UninitializedDetector)?;
        self.state = TrainerState::Test;

        detector.set_mode(Phase::Test);
        detector.forward(y)
    }

    /// Trains the detector the way its mode dictates for the given phase.
    ///
    /// `Joint` training and the `Train` phase of `Online` training fit the whole batch at
    /// once. In the `Test` phase, `Online` training adapts the running detector on every frame
    /// of the batch in order.
    ///
    /// # Returns
    /// The losses of every step taken, in order.
    pub fn train_loop(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        max_epochs: usize,
        phase: Phase,
    ) -> Result<Vec<f32>> {
        if self.detector.is_none() {
            return Err(MlErr::UninitializedDetector);
        }

        match (self.spec.mode, phase) {
            (TrainingMode::Joint, _) | (TrainingMode::Online, Phase::Train) => {
                self.train_model(x, y, max_epochs)
            }
            (TrainingMode::Online, Phase::Test) => {
                check_rows(x, y)?;

                let mut losses = Vec::new();
                let frames = x
                    .axis_chunks_iter(Axis(0), self.frame_size)
                    .zip(y.axis_chunks_iter(Axis(0), self.frame_size));

                for (i, (x_frame, y_frame)) in frames.enumerate() {
                    debug!(frame = i; "adapting on frame");
                    losses.extend(self.online_train_loop(x_frame, y_frame, max_epochs)?);
                }

                Ok(losses)
            }
        }
    }

    /// Adapts the running detector on a single frame.
    ///
    /// The targets are the true symbols `x_frame` or, when self supervised, the detector's own
    /// hard decisions over `y_frame`.
    ///
    /// # Returns
    /// The losses of every step taken.
    pub fn online_train_loop(
        &mut self,
        x_frame: ArrayView2<f32>,
        y_frame: ArrayView2<f32>,
        max_epochs: usize,
    ) -> Result<Vec<f32>> {
        let labels = match self.spec.label_source {
            LabelSource::LabelFeedback => x_frame.to_owned(),
            LabelSource::SelfSupervised => decide_symbols(self.predict(y_frame)?.view()),
        };

        self.train_model(labels.view(), y_frame, max_epochs)
    }
}

impl<D, F> Display for DetectorTrainer<D, F>
where
    D: Detector,
    F: FnMut(usize) -> Result<D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detector {
            Some(detector) => write!(f, "{}", detector.name()),
            None => write!(f, "uninitialized trainer"),
        }
    }
}

/// Trains `detector` for up to `max_epochs` full batch steps, minimizing the binary cross
/// entropy between its outputs over `y` and the bits behind the symbols `x`.
///
/// A fresh optimizer is built for every call.
///
/// # Returns
/// The loss of every step taken, or `NumericalDivergence` as soon as a loss is not finite.
pub fn train_detector<D>(
    detector: &mut D,
    spec: &TrainerSpec,
    x: ArrayView2<f32>,
    y: ArrayView2<f32>,
    max_epochs: usize,
) -> Result<Vec<f32>>
where
    D: Detector + ?Sized,
{
    check_rows(x, y)?;

    let targets = symbols_to_bits(x);
    let mut optimizer = build_optimizer(&spec.optimizer, detector.parameters().len());
    let mut losses = Vec::with_capacity(max_epochs);

    detector.set_mode(Phase::Train);

    for epoch in 0..max_epochs {
        detector.zero_grad();

        let out = detector.forward(y)?;
        let loss = Bce.loss(out.view(), targets.view());
        if !loss.is_finite() {
            return Err(MlErr::NumericalDivergence { epoch, loss });
        }

        trace!(epoch = epoch, loss = loss; "training step");
        losses.push(loss);

        detector.backward(Bce.loss_prime(out.view(), targets.view()))?;
        detector.step(&mut *optimizer)?;

        if spec.early_stop_loss.is_some_and(|stop| loss < stop) {
            debug!(epoch = epoch, loss = loss; "stopping early");
            break;
        }
    }

    if let Some(last) = losses.last() {
        debug!(epochs = losses.len(), loss = *last; "finished training");
    }

    Ok(losses)
}

fn check_rows(x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
    if x.nrows() != y.nrows() {
        return Err(MlErr::SizeMismatch {
            what: "observation rows",
            got: y.nrows(),
            expected: x.nrows(),
        });
    }

    Ok(())
}
