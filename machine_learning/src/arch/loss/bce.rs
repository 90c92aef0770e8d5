use ndarray::{Array2, ArrayView2, Zip};

use super::LossFn;
use crate::arch::activations::sigmoid;

/// The floor applied to every logarithm, keeping saturated outputs finite.
const LOG_FLOOR: f32 = -100.;

/// Binary cross entropy over the sigmoid of raw detector outputs (logits).
///
/// The targets are bits in `{0, 1}` and the loss is averaged over every element.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bce;

impl Bce {
    pub fn new() -> Self {
        Self
    }
}

fn clamped_ln(x: f32) -> f32 {
    let ln = x.ln();
    // NaN fails the comparison and propagates.
    if ln < LOG_FLOOR { LOG_FLOOR } else { ln }
}

impl LossFn for Bce {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = y_pred.len().max(1) as f32;
        let total = Zip::from(&y_pred).and(&y).fold(0., |acc, &z, &t| {
            let p = sigmoid(z);
            acc - (t * clamped_ln(p) + (1. - t) * clamped_ln(1. - p))
        });

        total / n
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.len().max(1) as f32;
        Zip::from(&y_pred)
            .and(&y)
            .map_collect(|&z, &t| (sigmoid(z) - t) / n)
    }
}
