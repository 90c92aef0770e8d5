use ndarray::{Array2, ArrayView2};
use rand::{Rng, rngs::StdRng};

use super::{Dense, Dropout};
use crate::{Result, arch::activations::ActFn};

#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}
use Layer::*;

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn dropout(rate: f32, rng: StdRng) -> Result<Self> {
        Dropout::new(rate, rng).map(Self::Dropout)
    }

    /// The amount of parameters of this layer.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
            Dropout(_) => 0,
        }
    }

    pub fn init_params<R: Rng + ?Sized>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        match self {
            Dense(l) => l.init_params(params, rng),
            Dropout(_) => Ok(()),
        }
    }

    pub fn set_training(&mut self, training: bool) {
        if let Dropout(l) = self {
            l.set_active(training);
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.forward(params, x),
            Dropout(l) => Ok(l.forward(x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.backward(params, grad, d),
            Dropout(l) => l.backward(d),
        }
    }
}
