use std::num::NonZeroUsize;

use log::debug;
use ndarray::{Array2, s};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    ChannelErr, Phase, Result, model::ChannelModel, snr::sigma_from_snr,
    symbols::generate_symbols,
};

/// A single transmission frame, all of its symbols share one channel realization.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The transmitted symbols, `(frame_size, n_user)`.
    pub symbols: Array2<f32>,
    /// The received signal, `(frame_size, n_ant)`.
    pub observations: Array2<f32>,
    /// The channel the frame went through, `(n_ant, n_user)`.
    pub channel: Array2<f32>,
}

/// Generates transmitted symbols and their noisy observations through a channel model.
pub struct DataGenerator {
    model: ChannelModel,
    frame_size: NonZeroUsize,
}

impl DataGenerator {
    /// Creates a new `DataGenerator`.
    ///
    /// # Arguments
    /// * `model` - The channel model every frame goes through.
    /// * `frame_size` - The amount of symbols per frame.
    ///
    /// # Returns
    /// A new `DataGenerator` instance.
    pub fn new(model: ChannelModel, frame_size: NonZeroUsize) -> Self {
        Self { model, frame_size }
    }

    pub fn model(&self) -> &ChannelModel {
        &self.model
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size.get()
    }

    /// Computes the amount of whole frames fitting in `total_size` samples.
    ///
    /// # Returns
    /// The amount of frames or an error if not even one frame fits.
    pub fn frame_count(&self, total_size: usize) -> Result<usize> {
        let frame_count = total_size / self.frame_size();
        if frame_count == 0 {
            return Err(ChannelErr::InvalidConfiguration {
                what: "size",
                reason: format!(
                    "{total_size} samples do not fill a frame of {}",
                    self.frame_size()
                ),
            });
        }

        Ok(frame_count)
    }

    /// Generates the frames fitting in `total_size` samples.
    ///
    /// Frame `i` goes through the channel of iteration `i`, its observations being
    /// `symbols · Hᵀ` plus white gaussian noise of variance `sigma_from_snr(snr_db)`.
    ///
    /// # Arguments
    /// * `total_size` - The amount of samples to generate, rounded down to whole frames.
    /// * `phase` - The simulation phase.
    /// * `snr_db` - The signal to noise ratio in dB.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// The generated frames or an error if the size is invalid or the channel failed.
    pub fn generate_frames<R>(
        &self,
        total_size: usize,
        phase: Phase,
        snr_db: f32,
        rng: &mut R,
    ) -> Result<Vec<Frame>>
    where
        R: Rng + ?Sized,
    {
        let frame_count = self.frame_count(total_size)?;
        let frame_size = self.frame_size();
        let std_dev = sigma_from_snr(snr_db).sqrt();

        debug!(frames = frame_count, snr_db = snr_db; "generating {phase} data");

        (0..frame_count)
            .map(|i| {
                let channel = self.model.get_channel(phase, i, rng)?;
                let symbols = generate_symbols(frame_size, self.model.n_user(), rng);

                let noise: Array2<f32> =
                    Array2::random_using((frame_size, self.model.n_ant()), StandardNormal, rng);
                let observations = symbols.dot(&channel.t()) + noise * std_dev;

                Ok(Frame {
                    symbols,
                    observations,
                    channel,
                })
            })
            .collect()
    }

    /// Generates `total_size` samples rounded down to whole frames.
    ///
    /// # Arguments
    /// * `total_size` - The amount of samples to generate.
    /// * `phase` - The simulation phase.
    /// * `snr_db` - The signal to noise ratio in dB.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// A tuple of the transmitted symbols `(frames * frame_size, n_user)` and their
    /// observations `(frames * frame_size, n_ant)`, or an error if generation failed.
    pub fn generate<R>(
        &self,
        total_size: usize,
        phase: Phase,
        snr_db: f32,
        rng: &mut R,
    ) -> Result<(Array2<f32>, Array2<f32>)>
    where
        R: Rng + ?Sized,
    {
        let frames = self.generate_frames(total_size, phase, snr_db, rng)?;
        Ok(concat_frames(&frames, self.model.n_user(), self.model.n_ant()))
    }
}

/// Stacks the symbols and observations of the frames in order.
pub fn concat_frames(frames: &[Frame], n_user: usize, n_ant: usize) -> (Array2<f32>, Array2<f32>) {
    let rows: usize = frames.iter().map(|f| f.symbols.nrows()).sum();
    let mut symbols = Array2::zeros((rows, n_user));
    let mut observations = Array2::zeros((rows, n_ant));

    let mut start = 0;
    for frame in frames {
        let end = start + frame.symbols.nrows();
        symbols.slice_mut(s![start..end, ..]).assign(&frame.symbols);
        observations
            .slice_mut(s![start..end, ..])
            .assign(&frame.observations);
        start = end;
    }

    (symbols, observations)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{model::ChannelVariant, spec::ChannelSpec};

    fn generator(variant: ChannelVariant, frame_size: usize) -> DataGenerator {
        let spec = ChannelSpec {
            variant,
            n_ant: NonZeroUsize::new(4).unwrap(),
            n_user: NonZeroUsize::new(2).unwrap(),
            csi_noise: 0.,
            fading: false,
            trace_root: None,
        };

        DataGenerator::new(ChannelModel::new(spec), NonZeroUsize::new(frame_size).unwrap())
    }

    #[test]
    fn one_frame_when_size_equals_frame_size() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = generator(ChannelVariant::SpatialExponentialDecay, 100);

        assert_eq!(generator.frame_count(100).unwrap(), 1);

        let (x, y) = generator.generate(100, Phase::Train, 10., &mut rng).unwrap();
        assert_eq!(x.dim(), (100, 2));
        assert_eq!(y.dim(), (100, 4));
    }

    #[test]
    fn size_is_rounded_down_to_whole_frames() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = generator(ChannelVariant::Gaussian, 10);

        let frames = generator
            .generate_frames(35, Phase::Test, 5., &mut rng)
            .unwrap();
        assert_eq!(frames.len(), 3);

        let (x, y) = concat_frames(&frames, 2, 4);
        assert_eq!(x.nrows(), 30);
        assert_eq!(y.nrows(), 30);
        assert_eq!(x.slice(s![10..20, ..]), frames[1].symbols);
    }

    #[test]
    fn smaller_than_a_frame_is_invalid() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = generator(ChannelVariant::SpatialExponentialDecay, 100);

        let err = generator
            .generate(99, Phase::Train, 10., &mut rng)
            .unwrap_err();
        assert!(matches!(err, ChannelErr::InvalidConfiguration { .. }));
    }

    #[test]
    fn gaussian_frames_draw_new_channels() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = generator(ChannelVariant::Gaussian, 10);

        let frames = generator
            .generate_frames(20, Phase::Train, 10., &mut rng)
            .unwrap();
        assert_ne!(frames[0].channel, frames[1].channel);
    }
}
