use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::layers::Layer;
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The model does not own its parameters, every pass receives them as one flat slice laid out
/// layer after layer.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
    offsets: Vec<usize>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<Layer> = layers.into_iter().collect();
        let offsets = std::iter::once(0)
            .chain(layers.iter().scan(0, |acc, layer| {
                *acc += layer.size();
                Some(*acc)
            }))
            .collect();

        Self { layers, offsets }
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.offsets.last().copied().unwrap_or_default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Initializes every layer's share of `params`.
    pub fn init_params<R: Rng + ?Sized>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        self.check_len("parameters", params.len())?;

        for (i, layer) in self.layers.iter().enumerate() {
            layer.init_params(&mut params[self.offsets[i]..self.offsets[i + 1]], rng)?;
        }

        Ok(())
    }

    /// Switches the layers that behave differently while training, like dropout.
    pub fn set_training(&mut self, training: bool) {
        self.layers
            .iter_mut()
            .for_each(|layer| layer.set_training(training));
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The parameters of the model.
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_len("parameters", params.len())?;

        let mut a = x.to_owned();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            a = layer.forward(&params[self.offsets[i]..self.offsets[i + 1]], a.view())?;
        }

        Ok(a)
    }

    /// Backpropagates `d`, the gradient of the loss with respect to the model's output,
    /// accumulating the parameter gradient into `grad`.
    ///
    /// # Returns
    /// The gradient of the loss with respect to the model's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        self.check_len("parameters", params.len())?;
        self.check_len("gradient", grad.len())?;

        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            let range = self.offsets[i]..self.offsets[i + 1];
            d = layer.backward(&params[range.clone()], &mut grad[range], d)?;
        }

        Ok(d)
    }

    fn check_len(&self, what: &'static str, len: usize) -> Result<()> {
        if len != self.size() {
            return Err(MlErr::SizeMismatch {
                what,
                got: len,
                expected: self.size(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::activations::ActFn;

    fn net() -> Sequential {
        Sequential::new([
            Layer::dense((2, 3), Some(ActFn::sigmoid(1.))),
            Layer::dense((3, 1), None),
        ])
    }

    #[test]
    fn size_sums_the_layers() {
        assert_eq!(net().size(), 9 + 4);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mut net = net();
        let params: Vec<f32> = (0..net.size()).map(|i| ((i as f32) * 0.37).sin()).collect();
        let x = array![[0.5, -1.], [1.5, 0.25]];

        // loss = sum of the outputs, so its gradient with respect to them is one.
        let out = net.forward(&params, x.view()).unwrap();
        let mut grad = vec![0.; net.size()];
        net.backward(&params, &mut grad, Array2::ones(out.dim()))
            .unwrap();

        let eps = 1e-2;
        for i in 0..params.len() {
            let mut shifted = params.clone();
            shifted[i] += eps;
            let up = net.forward(&shifted, x.view()).unwrap().sum();
            shifted[i] -= 2. * eps;
            let down = net.forward(&shifted, x.view()).unwrap().sum();

            let numeric = (up - down) / (2. * eps);
            assert!(
                (numeric - grad[i]).abs() < 1e-2,
                "param {i}: {numeric} != {}",
                grad[i]
            );
        }
    }

    #[test]
    fn wrong_parameter_count_is_rejected() {
        let mut net = net();
        let res = net.forward(&[0.; 5], Array2::zeros((1, 2)).view());

        assert!(matches!(
            res,
            Err(MlErr::SizeMismatch {
                got: 5,
                expected: 13,
                ..
            })
        ));
    }
}
