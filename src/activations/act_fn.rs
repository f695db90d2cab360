use super::{Linear, Relu, Sigmoid, Tanh};

/// The activation capability of one layer of a flat network.
///
/// Derivatives are evaluated from both the pre-activation sum and the
/// post-activation output, whichever the function finds cheaper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Linear(Linear),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
}

impl ActFn {
    pub fn linear() -> Self {
        Self::Linear(Linear)
    }

    pub fn sigmoid() -> Self {
        Self::Sigmoid(Sigmoid)
    }

    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn f(&self, sum: f64) -> f64 {
        match self {
            Self::Linear(a) => a.f(sum),
            Self::Sigmoid(a) => a.f(sum),
            Self::Tanh(a) => a.f(sum),
            Self::Relu(a) => a.f(sum),
        }
    }

    /// Evaluates the derivative of the activation.
    ///
    /// # Arguments
    /// * `sum` - The neuron's pre-activation sum.
    /// * `output` - The neuron's post-activation output.
    ///
    /// # Returns
    /// The slope of the activation at `sum`.
    pub fn df(&self, sum: f64, output: f64) -> f64 {
        match self {
            Self::Linear(a) => a.df(sum, output),
            Self::Sigmoid(a) => a.df(sum, output),
            Self::Tanh(a) => a.df(sum, output),
            Self::Relu(a) => a.df(sum, output),
        }
    }
}
