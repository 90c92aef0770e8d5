use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

/// Draws a channel matrix with i.i.d. standard normal entries.
pub fn calculate_channel<R>(n_ant: usize, n_user: usize, rng: &mut R) -> Array2<f32>
where
    R: Rng + ?Sized,
{
    Array2::random_using((n_ant, n_user), StandardNormal, rng)
}
