use ndarray::{linalg, prelude::*};
use rand::Rng;

use crate::{MlErr, Result, arch::activations::ActFn, arch::init};

/// A fully connected layer, `a = act_fn(x · W + b)`.
///
/// Its parameters are laid out as the row major `(input, output)` weights followed by the
/// `output` biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Option<Array2<f32>>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output dimensions.
    /// * `act_fn` - The activation function, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            act_fn,
            size: (dim.0 + 1) * dim.1,
            x: None,
            z: Array2::zeros((0, dim.1)),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Writes Xavier uniform weights and zeroed biases into `params`.
    pub fn init_params<R: Rng + ?Sized>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        let w_size = self.size - self.dim.1;
        let (w, b) = params.split_at_mut(w_size);
        init::xavier_uniform(w, self.dim.0, self.dim.1, rng)?;
        b.fill(0.);
        Ok(())
    }

    /// Makes a forward pass through the layer, caching what the backward pass needs.
    ///
    /// # Arguments
    /// * `params` - The parameters of this layer.
    /// * `x` - The `(batch, input)` input.
    ///
    /// # Returns
    /// The `(batch, output)` activations or an error if the sizes do not match.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let z = x.dot(&w) + &b;
        let a = match &self.act_fn {
            Some(act_fn) => z.mapv(|z| act_fn.f(z)),
            None => z.clone(),
        };

        self.x = Some(x.to_owned());
        self.z = z;
        Ok(a)
    }

    /// Backpropagates `d`, the gradient of the loss with respect to this layer's output.
    ///
    /// The parameter gradient gets accumulated into `grad`.
    ///
    /// # Returns
    /// The gradient of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        let x = self.x.as_ref().ok_or(MlErr::MissingForwardPass)?;
        if d.dim() != self.z.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dense delta",
                got: d.len(),
                expected: self.z.len(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (w, _) = self.view_params(params)?;
        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense gradient", grad.len())?;

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.mismatch(w_size))?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).map_err(|_| self.mismatch(w_size))?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense parameters", params.len())?;

        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let w = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.mismatch(w_size))?;
        let b = ArrayView1::from_shape(self.dim.1, b_raw).map_err(|_| self.mismatch(w_size))?;
        Ok((w, b))
    }

    fn check_len(&self, what: &'static str, len: usize) -> Result<()> {
        if len != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got: len,
                expected: self.size,
            });
        }

        Ok(())
    }

    fn mismatch(&self, got: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "dense weights",
            got,
            expected: self.dim.0 * self.dim.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // w = [[1, 2], [3, 4], [5, 6]], b = [0.5, -0.5]
    const PARAMS: [f32; 8] = [1., 2., 3., 4., 5., 6., 0.5, -0.5];

    #[test]
    fn forward_is_affine_without_activation() {
        let mut dense = Dense::new((3, 2), None);
        let x = array![[1., 0., -1.], [0., 1., 0.]];

        let out = dense.forward(&PARAMS, x.view()).unwrap();
        assert_eq!(out, array![[-3.5, -4.5], [3.5, 3.5]]);
    }

    #[test]
    fn backward_accumulates_the_gradient() {
        let mut dense = Dense::new((3, 2), None);
        let x = array![[1., 0., -1.], [0., 1., 0.]];
        let mut grad = [0.; 8];

        dense.forward(&PARAMS, x.view()).unwrap();
        let d = array![[1., 0.], [0., 2.]];
        let dx = dense.backward(&PARAMS, &mut grad, d.clone()).unwrap();

        // dW = xᵀ d, db = sum of the rows of d, dx = d Wᵀ
        assert_eq!(grad, [1., 0., 0., 2., -1., 0., 1., 2.]);
        assert_eq!(dx, array![[1., 3., 5.], [4., 8., 12.]]);

        dense.forward(&PARAMS, x.view()).unwrap();
        dense.backward(&PARAMS, &mut grad, d).unwrap();
        assert_eq!(grad, [2., 0., 0., 4., -2., 0., 2., 4.]);
    }

    #[test]
    fn backward_needs_a_forward_pass() {
        let mut dense = Dense::new((3, 2), None);
        let mut grad = [0.; 8];

        let res = dense.backward(&PARAMS, &mut grad, Array2::zeros((1, 2)));
        assert!(matches!(res, Err(MlErr::MissingForwardPass)));
    }

    #[test]
    fn wrong_input_width_is_rejected() {
        let mut dense = Dense::new((3, 2), None);
        let res = dense.forward(&PARAMS, Array2::zeros((4, 2)).view());

        assert!(matches!(
            res,
            Err(MlErr::SizeMismatch {
                got: 2,
                expected: 3,
                ..
            })
        ));
    }
}
