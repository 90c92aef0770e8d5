use ndarray::prelude::*;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand_distr::Bernoulli;

use crate::{MlErr, Result};

/// Inverted dropout: while active, zeroes each unit with probability `rate` and scales the
/// surviving ones by `1 / (1 - rate)`, so evaluation needs no rescaling.
#[derive(Clone, Debug)]
pub struct Dropout {
    keep: Bernoulli,
    rate: f32,
    active: bool,
    mask: Option<Array2<f32>>,
    rng: StdRng,
}

impl Dropout {
    /// Creates a new inactive `Dropout` layer.
    ///
    /// # Arguments
    /// * `rate` - The probability of dropping a unit, in `[0, 1)`.
    /// * `rng` - The generator the masks are drawn from.
    ///
    /// # Returns
    /// A new `Dropout` or an error if the rate is out of range.
    pub fn new(rate: f32, rng: StdRng) -> Result<Self> {
        if !(0.0..1.0).contains(&rate) {
            return Err(MlErr::InvalidSpec(format!(
                "dropout rate must be in [0, 1), got {rate}"
            )));
        }

        let keep = Bernoulli::new(1. - rate as f64)
            .map_err(|e| MlErr::InvalidSpec(format!("dropout rate {rate}: {e}")))?;

        Ok(Self {
            keep,
            rate,
            active: false,
            mask: None,
            rng,
        })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        if !self.active || self.rate == 0. {
            self.mask = None;
            return x.to_owned();
        }

        let scale = 1. / (1. - self.rate);
        let mask = Array2::random_using(x.dim(), self.keep, &mut self.rng)
            .mapv(|keep| if keep { scale } else { 0. });

        let out = &x * &mask;
        self.mask = Some(mask);
        out
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        match &self.mask {
            Some(mask) if mask.dim() != d.dim() => Err(MlErr::SizeMismatch {
                what: "dropout delta",
                got: d.len(),
                expected: mask.len(),
            }),
            Some(mask) => Ok(d * mask),
            None => Ok(d),
        }
    }
}
