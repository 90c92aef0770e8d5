pub mod activations;
mod deep_rx;
mod detector;
pub mod init;
pub mod layers;
pub mod loss;
mod sequential;

pub use deep_rx::DeepRx;
pub use detector::Detector;
pub use sequential::Sequential;
