use channel::Phase;
use ndarray::{Array2, ArrayView2};

use crate::{Result, optimization::Optimizer};

/// A trainable signal detector, mapping observations `(batch, n_ant)` to one logit per
/// user `(batch, n_user)`.
///
/// A positive logit means the detector believes the transmitted bit was a one.
pub trait Detector {
    /// The name the detector reports itself as.
    fn name(&self) -> &str;

    /// Switches between training and evaluation behavior.
    fn set_mode(&mut self, phase: Phase);

    /// Makes a forward pass, caching whatever `backward` needs.
    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Backpropagates the gradient of the loss with respect to the last forward pass' output,
    /// accumulating the gradient of the parameters.
    fn backward(&mut self, d: Array2<f32>) -> Result<()>;

    fn parameters(&self) -> &[f32];

    /// Gives mutable access to the parameters and their gradient at once.
    fn parameters_and_grad(&mut self) -> (&mut [f32], &mut [f32]);

    fn zero_grad(&mut self) {
        self.parameters_and_grad().1.fill(0.);
    }

    /// Updates the parameters with the accumulated gradient.
    fn step(&mut self, optimizer: &mut dyn Optimizer) -> Result<()> {
        let (params, grad) = self.parameters_and_grad();
        optimizer.update_params(grad, params)
    }
}
