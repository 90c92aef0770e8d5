use ndarray::{Array2, ArrayView2};

/// Hard decides the bits behind a batch of logits, `sigmoid(z) >= 0.5` meaning a one.
pub fn decide_bits(logits: ArrayView2<f32>) -> Array2<f32> {
    logits.mapv(|z| if z >= 0. { 1. } else { 0. })
}

/// Hard decides the BPSK symbols behind a batch of logits, a one bit being the symbol `-1`.
pub fn decide_symbols(logits: ArrayView2<f32>) -> Array2<f32> {
    logits.mapv(|z| if z >= 0. { -1. } else { 1. })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn zero_logit_decides_a_one() {
        let logits = array![[0., -0.1], [3., -2.]];

        assert_eq!(decide_bits(logits.view()), array![[1., 0.], [1., 0.]]);
        assert_eq!(decide_symbols(logits.view()), array![[-1., 1.], [-1., 1.]]);
    }
}
