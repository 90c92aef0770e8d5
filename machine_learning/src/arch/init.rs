use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{MlErr, Result};

/// Fills `weights` using Xavier uniform initialization, `U(-r, r)` with
/// `r = sqrt(6 / (fan_in + fan_out))`.
///
/// # Arguments
/// * `weights` - The weights to overwrite.
/// * `fan_in` - The number of input units of the layer.
/// * `fan_out` - The number of output units of the layer.
/// * `rng` - A random number generator.
///
/// # Returns
/// An error if the calculated range is invalid.
pub fn xavier_uniform<R: Rng + ?Sized>(
    weights: &mut [f32],
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Result<()> {
    let range = (6. / (fan_in + fan_out) as f32).sqrt();
    let distribution = Uniform::new(-range, range)
        .map_err(|e| MlErr::InvalidSpec(format!("xavier range {range}: {e}")))?;

    weights
        .iter_mut()
        .for_each(|w| *w = distribution.sample(rng));

    Ok(())
}
