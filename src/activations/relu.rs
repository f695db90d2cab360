#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Relu;

impl Relu {
    pub fn f(&self, z: f64) -> f64 {
        z.max(0.)
    }

    // The slope at exactly zero is taken as 0.
    pub fn df(&self, z: f64, _a: f64) -> f64 {
        if z > 0. { 1. } else { 0. }
    }
}
