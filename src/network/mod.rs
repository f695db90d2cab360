mod cache;
mod flat;
mod layout;

pub use cache::NeuronCache;
pub use flat::FlatNetwork;
pub use layout::{FlatLayout, LayerSpan, WeightBlock};

use crate::activations::ActFn;

/// The output of every bias neuron.
pub const BIAS_ACTIVATION: f64 = 1.0;

/// One layer of a network before flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDef {
    pub size: usize,
    pub act_fn: ActFn,
    pub bias: bool,
}

impl LayerDef {
    /// Creates a new layer with a bias neuron.
    ///
    /// # Arguments
    /// * `size` - The amount of neurons, bias excluded.
    /// * `act_fn` - The activation applied to the layer's sums.
    pub fn new(size: usize, act_fn: ActFn) -> Self {
        Self {
            size,
            act_fn,
            bias: true,
        }
    }

    /// Creates a new output layer, which never has a bias neuron.
    pub fn output(size: usize, act_fn: ActFn) -> Self {
        Self::new(size, act_fn).without_bias()
    }

    pub fn without_bias(mut self) -> Self {
        self.bias = false;
        self
    }
}
