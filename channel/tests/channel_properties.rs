use std::num::NonZeroUsize;

use channel::{
    ChannelErr, ChannelModel, ChannelSpec, ChannelVariant, DataGenerator, Phase, Result,
    snr::sigma_from_snr, trace::TraceSource,
};
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};

/// Every user shares one synthetic trace of 8 stored rows and 16 taps, train traces being
/// twice as long as test ones.
struct Synthetic;

impl TraceSource for Synthetic {
    fn load(&self, phase: Phase, user: usize) -> Result<Array2<f32>> {
        if user > 3 {
            return Err(ChannelErr::TraceExhausted {
                user,
                iteration: 0,
                len: 0,
            });
        }

        let rows = match phase {
            Phase::Train => 8,
            Phase::Test => 4,
        };
        Ok(Array2::from_shape_fn((rows, 16), |(r, t)| {
            (r as f32 * 0.3 + t as f32 * 0.1 * user as f32).sin()
        }))
    }
}

fn spec(variant: ChannelVariant, n_ant: usize, n_user: usize, fading: bool) -> ChannelSpec {
    ChannelSpec {
        variant,
        n_ant: NonZeroUsize::new(n_ant).unwrap(),
        n_user: NonZeroUsize::new(n_user).unwrap(),
        csi_noise: 0.,
        fading,
        trace_root: None,
    }
}

#[test]
fn sed_channel_is_exact_and_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 6, 3, false));

    let h = model.get_channel(Phase::Train, 0, &mut rng).unwrap();
    assert_eq!(h.dim(), (6, 3));

    for ((i, j), &x) in h.indexed_iter() {
        assert_eq!(x, (-(i.abs_diff(j) as f32)).exp());
    }

    for iteration in 1..5 {
        assert_eq!(model.get_channel(Phase::Train, iteration, &mut rng).unwrap(), h);
    }
}

#[test]
fn gaussian_channel_is_standard_normal() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = ChannelModel::new(spec(ChannelVariant::Gaussian, 4, 2, false));

    let first = model.get_channel(Phase::Train, 0, &mut rng).unwrap();
    let second = model.get_channel(Phase::Train, 0, &mut rng).unwrap();
    assert_ne!(first, second);

    let samples: Vec<f32> = (0..2000)
        .flat_map(|i| model.get_channel(Phase::Train, i, &mut rng).unwrap())
        .collect();

    let n = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / n;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;

    assert!(mean.abs() < 0.05, "mean {mean}");
    assert!((var - 1.).abs() < 0.1, "variance {var}");
}

#[test]
fn fading_never_applies_in_train() {
    let mut rng = StdRng::seed_from_u64(42);
    let faded = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 4, 4, true));
    let plain = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 4, 4, false));

    for iteration in 0..60 {
        assert_eq!(
            faded.get_channel(Phase::Train, iteration, &mut rng).unwrap(),
            plain.get_channel(Phase::Train, iteration, &mut rng).unwrap(),
        );
    }
}

#[test]
fn test_fading_starts_at_unity() {
    let mut rng = StdRng::seed_from_u64(42);
    let faded = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 4, 4, true));
    let plain = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 4, 4, false));

    assert_eq!(
        faded.get_channel(Phase::Test, 0, &mut rng).unwrap(),
        plain.get_channel(Phase::Test, 0, &mut rng).unwrap(),
    );

    let h = faded.get_channel(Phase::Test, 10, &mut rng).unwrap();
    let h0 = plain.get_channel(Phase::Test, 10, &mut rng).unwrap();
    assert!(h.iter().zip(&h0).all(|(a, b)| a <= b));
    assert_ne!(h, h0);
}

#[test]
fn observations_carry_noise_of_the_target_snr() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 4, 2, false));
    let generator = DataGenerator::new(model, NonZeroUsize::new(100).unwrap());

    let frames = generator
        .generate_frames(100, Phase::Train, 10., &mut rng)
        .unwrap();
    assert_eq!(frames.len(), 1);

    let frame = &frames[0];
    assert_eq!(frame.observations.dim(), (100, 4));
    assert_eq!(frame.symbols.dim(), (100, 2));

    let clean = frame.symbols.dot(&frame.channel.t());
    let mse = (&frame.observations - &clean)
        .mapv(|e| e.powi(2))
        .mean()
        .unwrap();

    let sigma = sigma_from_snr(10.);
    assert!((mse - sigma).abs() < 0.035, "mse {mse}, sigma {sigma}");
}

#[test]
fn empirical_channel_reads_its_traces() {
    let mut rng = StdRng::seed_from_u64(42);
    let model = ChannelModel::with_traces(
        spec(ChannelVariant::EmpiricalTrace, 6, 3, false),
        Synthetic,
    );

    for iteration in 0..8 {
        let h = model.get_channel(Phase::Train, iteration, &mut rng).unwrap();
        assert_eq!(h.dim(), (6, 3));
        assert!(h.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    let err = model.get_channel(Phase::Test, 4, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        ChannelErr::TraceExhausted {
            user: 1,
            iteration: 4,
            len: 4
        }
    ));

    let too_many_users = ChannelModel::with_traces(
        spec(ChannelVariant::EmpiricalTrace, 6, 4, false),
        Synthetic,
    );
    assert!(too_many_users.get_channel(Phase::Train, 0, &mut rng).is_err());
}
