use ndarray::Array2;

/// Computes the spatial exponential decay channel, `H[i, j] = exp(-|i - j|)`.
pub fn calculate_channel(n_ant: usize, n_user: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_ant, n_user), |(i, j)| (-(i.abs_diff(j) as f32)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_is_one_and_decays_away_from_it() {
        let h = calculate_channel(4, 2);

        assert_eq!(h.dim(), (4, 2));
        assert_eq!(h[[0, 0]], 1.0);
        assert_eq!(h[[1, 1]], 1.0);
        assert_eq!(h[[3, 0]], (-3.0f32).exp());
        assert_eq!(h[[0, 1]], h[[1, 0]]);
    }
}
