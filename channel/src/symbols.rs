use ndarray::{Array2, ArrayView2};
use rand::Rng;

/// Generates a `(frame_size, n_user)` batch of BPSK symbols.
///
/// Every bit is drawn uniformly from `{0, 1}` and mapped to the symbol `(-1)^bit`.
pub fn generate_symbols<R>(frame_size: usize, n_user: usize, rng: &mut R) -> Array2<f32>
where
    R: Rng + ?Sized,
{
    Array2::from_shape_simple_fn((frame_size, n_user), || {
        if rng.random::<bool>() { -1. } else { 1. }
    })
}

/// Maps BPSK symbols back to their bits, `(1 - s) / 2`.
pub fn symbols_to_bits(symbols: ArrayView2<f32>) -> Array2<f32> {
    symbols.mapv(|s| (1. - s) / 2.)
}

/// Maps bits to BPSK symbols, `1 - 2b`.
pub fn bits_to_symbols(bits: ArrayView2<f32>) -> Array2<f32> {
    bits.mapv(|b| 1. - 2. * b)
}
