mod cost;
mod gaussian;
mod impairments;
mod sed;

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use log::trace;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use impairments::{FADE_PERIODS, add_fading, fade_coefficient, noising_channel};

use crate::{
    ChannelErr, Phase, Result,
    spec::ChannelSpec,
    trace::{MatTraceSource, TraceSource},
};

/// The stochastic model a channel matrix is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChannelVariant {
    /// `H[i, j] = exp(-|i - j|)`, the same matrix for every frame.
    SpatialExponentialDecay,
    /// `H[i, j] ~ N(0, 1)`, redrawn for every frame.
    Gaussian,
    /// Normalized magnitude traces measured per user (COST 2100).
    EmpiricalTrace,
}

impl ChannelVariant {
    /// Returns the identifier of the variant used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelVariant::SpatialExponentialDecay => "SED",
            ChannelVariant::Gaussian => "Gaussian",
            ChannelVariant::EmpiricalTrace => "COST",
        }
    }

    /// Computes the impairment free channel matrix of this variant.
    ///
    /// # Arguments
    /// * `n_ant` - The amount of receiving antennas.
    /// * `n_user` - The amount of transmitting users.
    /// * `iteration` - The frame index.
    /// * `phase` - The simulation phase.
    /// * `traces` - Where the empirical traces are read from, only used by `EmpiricalTrace`.
    /// * `rng` - A random number generator, only used by `Gaussian`.
    ///
    /// # Returns
    /// A `(n_ant, n_user)` matrix or an error if the traces could not be read.
    pub fn calculate_channel<R>(
        &self,
        n_ant: usize,
        n_user: usize,
        iteration: usize,
        phase: Phase,
        traces: &dyn TraceSource,
        rng: &mut R,
    ) -> Result<Array2<f32>>
    where
        R: Rng + ?Sized,
    {
        let h = match self {
            ChannelVariant::SpatialExponentialDecay => sed::calculate_channel(n_ant, n_user),
            ChannelVariant::Gaussian => gaussian::calculate_channel(n_ant, n_user, rng),
            ChannelVariant::EmpiricalTrace => {
                cost::calculate_channel(traces, n_ant, n_user, iteration, phase)?
            }
        };

        Ok(h)
    }
}

impl Display for ChannelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelVariant {
    type Err = ChannelErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SED" => Ok(ChannelVariant::SpatialExponentialDecay),
            "Gaussian" => Ok(ChannelVariant::Gaussian),
            "COST" => Ok(ChannelVariant::EmpiricalTrace),
            other => Err(ChannelErr::UnsupportedChannelVariant(other.to_string())),
        }
    }
}

impl TryFrom<String> for ChannelVariant {
    type Error = ChannelErr;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ChannelVariant> for String {
    fn from(value: ChannelVariant) -> Self {
        value.as_str().to_string()
    }
}

/// A channel model: draws the channel matrix of every frame and applies the configured
/// impairments on top of it.
pub struct ChannelModel {
    spec: ChannelSpec,
    traces: Box<dyn TraceSource>,
}

impl ChannelModel {
    /// Creates a new `ChannelModel` reading empirical traces from the spec's trace root.
    ///
    /// # Arguments
    /// * `spec` - The specification for the channel.
    ///
    /// # Returns
    /// A new `ChannelModel` instance.
    pub fn new(spec: ChannelSpec) -> Self {
        let traces = MatTraceSource::new(spec.trace_root());
        Self::with_traces(spec, traces)
    }

    /// Creates a new `ChannelModel` with a custom source of empirical traces.
    ///
    /// # Arguments
    /// * `spec` - The specification for the channel.
    /// * `traces` - The source the `EmpiricalTrace` variant reads from.
    ///
    /// # Returns
    /// A new `ChannelModel` instance.
    pub fn with_traces<T>(spec: ChannelSpec, traces: T) -> Self
    where
        T: TraceSource + 'static,
    {
        Self {
            spec,
            traces: Box::new(traces),
        }
    }

    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }

    pub fn n_ant(&self) -> usize {
        self.spec.n_ant.get()
    }

    pub fn n_user(&self) -> usize {
        self.spec.n_user.get()
    }

    /// Computes the channel matrix of a frame.
    ///
    /// The variant's matrix is perturbed by the CSI noise and then faded, both steps only
    /// taking place in the `Test` phase.
    ///
    /// # Arguments
    /// * `phase` - The simulation phase.
    /// * `iteration` - The frame index.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// A `(n_ant, n_user)` matrix or an error if the variant failed to produce one.
    pub fn get_channel<R>(&self, phase: Phase, iteration: usize, rng: &mut R) -> Result<Array2<f32>>
    where
        R: Rng + ?Sized,
    {
        let ChannelSpec {
            variant,
            csi_noise,
            fading,
            ..
        } = self.spec;

        trace!(iteration = iteration; "computing {variant} channel for the {phase} phase");

        let h = variant.calculate_channel(
            self.n_ant(),
            self.n_user(),
            iteration,
            phase,
            self.traces.as_ref(),
            rng,
        )?;
        let h = noising_channel(h, csi_noise, phase, rng);
        Ok(add_fading(h, fading, phase, iteration))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn spec(variant: ChannelVariant, csi_noise: f32, fading: bool) -> ChannelSpec {
        ChannelSpec {
            variant,
            n_ant: NonZeroUsize::new(4).unwrap(),
            n_user: NonZeroUsize::new(2).unwrap(),
            csi_noise,
            fading,
            trace_root: None,
        }
    }

    #[test]
    fn variant_identifiers_round_trip() {
        for variant in [
            ChannelVariant::SpatialExponentialDecay,
            ChannelVariant::Gaussian,
            ChannelVariant::EmpiricalTrace,
        ] {
            assert_eq!(variant.as_str().parse::<ChannelVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn unknown_variant_is_unsupported() {
        let err = "Rician".parse::<ChannelVariant>().unwrap_err();
        assert!(matches!(err, ChannelErr::UnsupportedChannelVariant(name) if name == "Rician"));
    }

    #[test]
    fn train_phase_ignores_impairments() {
        let mut rng = StdRng::seed_from_u64(42);
        let clean = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 0.0, false));
        let impaired = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 0.5, true));

        for iteration in [0, 7, 30] {
            let a = clean.get_channel(Phase::Train, iteration, &mut rng).unwrap();
            let b = impaired
                .get_channel(Phase::Train, iteration, &mut rng)
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_phase_applies_csi_noise() {
        let mut rng = StdRng::seed_from_u64(42);
        let model = ChannelModel::new(spec(ChannelVariant::SpatialExponentialDecay, 0.5, false));

        let train = model.get_channel(Phase::Train, 3, &mut rng).unwrap();
        let test = model.get_channel(Phase::Test, 3, &mut rng).unwrap();

        assert_eq!(test.dim(), (4, 2));
        assert_ne!(train, test);
    }
}
