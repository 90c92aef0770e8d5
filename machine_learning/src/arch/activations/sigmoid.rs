/// The logistic function, `1 / (1 + e^-z)`.
pub fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

/// A sigmoid scaled by an amplitude, `amp / (1 + e^-z)`.
#[derive(Clone, Debug, Default)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp * sigmoid(z)
    }

    pub fn df(&self, z: f32) -> f32 {
        let s = sigmoid(z);
        self.amp * s * (1. - s)
    }
}
