mod bce;
mod loss_fn;

pub use bce::Bce;
pub use loss_fn::LossFn;
