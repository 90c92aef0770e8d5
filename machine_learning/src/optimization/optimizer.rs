use super::{Adam, GradientDescent};
use crate::{MlErr, Result, specs::OptimizerSpec};

/// Defines the strategy for updating model parameters based on calculated gradients.
pub trait Optimizer {
    /// Updates the provided slice of parameters using the accumulated gradient.
    ///
    /// # Arguments
    /// * `grad` - A reference to the model's gradient.
    /// * `params` - The parameters to update.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}

/// Builds a fresh optimizer for `len` parameters following a spec.
pub fn build_optimizer(spec: &OptimizerSpec, len: usize) -> Box<dyn Optimizer> {
    match *spec {
        OptimizerSpec::Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
        OptimizerSpec::GradientDescent { learning_rate } => {
            Box::new(GradientDescent::new(learning_rate))
        }
    }
}

pub(super) fn check_sizes(grad: &[f32], params: &[f32]) -> Result<()> {
    if grad.len() != params.len() {
        return Err(MlErr::SizeMismatch {
            what: "gradient",
            got: grad.len(),
            expected: params.len(),
        });
    }

    Ok(())
}
