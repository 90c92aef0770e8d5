use std::f64::consts::PI;

use ndarray::{Array2, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::Phase;

/// The fading period of each user, in frames. User `u` fades with `FADE_PERIODS[u % 4]`.
pub const FADE_PERIODS: [f64; 4] = [51., 39., 33., 21.];

/// Returns the fading multiplier of a user at a given frame,
/// `0.8 + 0.2 * cos(2π * iteration / period)`.
pub fn fade_coefficient(user: usize, iteration: usize) -> f32 {
    let period = FADE_PERIODS[user % FADE_PERIODS.len()];
    (0.8 + 0.2 * (2. * PI * iteration as f64 / period).cos()) as f32
}

/// Perturbs the channel to model imperfect channel state information.
///
/// Only in the `Test` phase and for a positive `csi_noise`, the channel gets multiplied by a
/// `(n_user, n_user)` standard normal matrix scaled by `1 + sqrt(csi_noise)`.
///
/// # Arguments
/// * `h` - The channel matrix.
/// * `csi_noise` - The CSI noise level.
/// * `phase` - The simulation phase.
/// * `rng` - A random number generator.
pub fn noising_channel<R>(h: Array2<f32>, csi_noise: f32, phase: Phase, rng: &mut R) -> Array2<f32>
where
    R: Rng + ?Sized,
{
    if phase != Phase::Test || csi_noise <= 0. {
        return h;
    }

    let n_user = h.ncols();
    let noise = Array2::<f32>::random_using((n_user, n_user), StandardNormal, rng)
        * (1. + csi_noise.sqrt());

    h.dot(&noise)
}

/// Applies the periodic per user fading, only in the `Test` phase and if `fading` is enabled.
///
/// # Arguments
/// * `h` - The channel matrix.
/// * `fading` - Whether fading is enabled.
/// * `phase` - The simulation phase.
/// * `iteration` - The frame index.
pub fn add_fading(mut h: Array2<f32>, fading: bool, phase: Phase, iteration: usize) -> Array2<f32> {
    if phase != Phase::Test || !fading {
        return h;
    }

    for (user, mut column) in h.axis_iter_mut(Axis(1)).enumerate() {
        column *= fade_coefficient(user, iteration);
    }

    h
}
