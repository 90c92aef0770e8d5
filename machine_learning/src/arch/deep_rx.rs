use channel::Phase;
use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Detector, Sequential, activations::ActFn, layers::Layer};
use crate::{MlErr, Result, specs::DetectorSpec};

/// A fully connected detector: sigmoid hidden layers with dropout after the first one and a
/// linear output layer emitting one logit per user.
#[derive(Debug)]
pub struct DeepRx {
    net: Sequential,
    params: Box<[f32]>,
    grad: Box<[f32]>,
    frame_size: usize,
}

impl DeepRx {
    /// Creates a new `DeepRx` with freshly initialized parameters.
    ///
    /// # Arguments
    /// * `spec` - The hidden layers and dropout rate.
    /// * `n_ant` - The amount of receiving antennas, the input width.
    /// * `n_user` - The amount of users, the output width.
    /// * `frame_size` - Every input must be made of whole frames of this size.
    /// * `rng` - The generator for the initial parameters and dropout masks.
    ///
    /// # Returns
    /// A new `DeepRx` or an error if the spec is invalid.
    pub fn new(
        spec: &DetectorSpec,
        n_ant: usize,
        n_user: usize,
        frame_size: usize,
        mut rng: StdRng,
    ) -> Result<Self> {
        if n_ant == 0 || n_user == 0 || frame_size == 0 {
            return Err(MlErr::InvalidSpec(format!(
                "empty detector, {n_ant} antennas, {n_user} users and frames of {frame_size}"
            )));
        }

        let mut layers = Vec::with_capacity(spec.hidden.len() + 2);
        let mut prev = n_ant;
        for (i, hidden) in spec.hidden.iter().enumerate() {
            layers.push(Layer::dense((prev, hidden.get()), Some(ActFn::sigmoid(1.))));
            if i == 0 {
                let dropout_rng = StdRng::seed_from_u64(rng.random());
                layers.push(Layer::dropout(spec.dropout, dropout_rng)?);
            }
            prev = hidden.get();
        }
        layers.push(Layer::dense((prev, n_user), None));

        let net = Sequential::new(layers);
        let mut params = vec![0.; net.size()].into_boxed_slice();
        net.init_params(&mut params, &mut rng)?;

        debug!(params = net.size(), layers = net.layers().len(); "built DeepRX detector");

        Ok(Self {
            grad: vec![0.; net.size()].into_boxed_slice(),
            net,
            params,
            frame_size,
        })
    }
}

impl Detector for DeepRx {
    fn name(&self) -> &str {
        "DeepRX"
    }

    fn set_mode(&mut self, phase: Phase) {
        self.net.set_training(phase == Phase::Train);
    }

    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let rows = x.nrows();
        if rows == 0 || rows % self.frame_size != 0 {
            return Err(MlErr::SizeMismatch {
                what: "detector input rows",
                got: rows,
                expected: rows.div_ceil(self.frame_size).max(1) * self.frame_size,
            });
        }

        self.net.forward(&self.params, x)
    }

    fn backward(&mut self, d: Array2<f32>) -> Result<()> {
        self.net.backward(&self.params, &mut self.grad, d)?;
        Ok(())
    }

    fn parameters(&self) -> &[f32] {
        &self.params
    }

    fn parameters_and_grad(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.params, &mut self.grad)
    }
}
