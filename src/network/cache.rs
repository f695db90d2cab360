use super::{BIAS_ACTIVATION, FlatLayout};

/// Per-neuron scratch of a forward pass: pre-activation sums and outputs.
///
/// Each gradient worker owns one of these, so concurrent forward passes over
/// the same `FlatNetwork` never write to the same memory.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronCache {
    pub(super) sums: Vec<f64>,
    pub(super) outputs: Vec<f64>,
}

impl NeuronCache {
    /// Creates a new cache for the given layout with the bias neurons already set.
    pub fn new(layout: &FlatLayout) -> Self {
        let n = layout.neuron_count();
        let mut outputs = vec![0.; n];

        for bias in layout.layers().iter().filter_map(|span| span.bias()) {
            outputs[bias] = BIAS_ACTIVATION;
        }

        Self {
            sums: vec![0.; n],
            outputs,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    #[inline]
    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    #[inline]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }
}
