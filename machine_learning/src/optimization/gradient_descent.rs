use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Gradient descent optimization algorithm.
#[derive(Debug)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    ///
    /// # Returns
    /// A new `GradientDescent` instance.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_sizes(grad, params)?;

        let lr = self.learning_rate;
        for (p, g) in params.iter_mut().zip(grad) {
            *p -= lr * g;
        }

        Ok(())
    }
}
