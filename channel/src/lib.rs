//! Multi-user MIMO channel simulation: channel matrices, BPSK symbols and noisy observations.

pub mod error;
pub mod generator;
pub mod model;
mod phase;
pub mod snr;
pub mod spec;
pub mod symbols;
pub mod trace;

pub use error::{ChannelErr, Result};
pub use generator::{DataGenerator, Frame};
pub use model::{ChannelModel, ChannelVariant};
pub use phase::Phase;
pub use spec::{ChannelSpec, DataSpec};
