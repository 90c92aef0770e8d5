/// Computes the noise variance for a target SNR in dB, `10^(-snr_db / 10)`.
pub fn sigma_from_snr(snr_db: f32) -> f32 {
    10f32.powf(-snr_db / 10.)
}
