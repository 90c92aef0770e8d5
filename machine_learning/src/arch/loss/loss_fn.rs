use ndarray::{Array2, ArrayView2};

/// A loss function over a batch of outputs and their targets.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// The gradient of `loss` with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
