use rand::Rng;

use super::{FlatLayout, LayerDef, NeuronCache};
use crate::{ChainRuleErr, Result, activations::ActFn, initialization::WeightInit};

/// A feed-forward network flattened into one weight buffer plus offset tables.
///
/// The network itself is read-only during a forward pass: the per-neuron sums
/// and outputs are written into a caller-owned `NeuronCache`. Replacing the
/// weights bumps the network's generation.
#[derive(Debug, Clone)]
pub struct FlatNetwork {
    layout: FlatLayout,
    act_fns: Vec<ActFn>,
    weights: Vec<f64>,
    generation: u64,
}

impl FlatNetwork {
    /// Creates a new `FlatNetwork`.
    ///
    /// # Arguments
    /// * `defs` - The layers in forward order, the input layer first.
    /// * `weights` - The flat weights, packed output block first.
    ///
    /// # Returns
    /// A new network or an error if the topology is malformed or the amount of
    /// weights doesn't match it.
    pub fn new(defs: &[LayerDef], weights: Vec<f64>) -> Result<Self> {
        let layout = FlatLayout::new(defs)?;

        if weights.len() != layout.weight_count() {
            return Err(ChainRuleErr::SizeMismatch {
                what: "weights",
                got: weights.len(),
                expected: layout.weight_count(),
            });
        }

        Ok(Self {
            act_fns: defs.iter().rev().map(|def| def.act_fn).collect(),
            layout,
            weights,
            generation: 0,
        })
    }

    /// Creates a new `FlatNetwork` with weights drawn from `init`.
    ///
    /// # Arguments
    /// * `defs` - The layers in forward order, the input layer first.
    /// * `init` - The weight initialization strategy.
    /// * `rng` - A random number generator.
    pub fn build<R: Rng + ?Sized>(defs: &[LayerDef], init: WeightInit, rng: &mut R) -> Result<Self> {
        let layout = FlatLayout::new(defs)?;
        let weights = init.sample(&layout, rng)?;
        Self::new(defs, weights)
    }

    #[inline]
    pub fn layout(&self) -> &FlatLayout {
        &self.layout
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn act_fn(&self, layer: usize) -> ActFn {
        self.act_fns[layer]
    }

    /// Slope of `layer`'s activation for a neuron with the given sum and output.
    #[inline]
    pub fn activation_derivative(&self, layer: usize, sum: f64, output: f64) -> f64 {
        self.act_fns[layer].df(sum, output)
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.layout.input().feed
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.layout.output().feed
    }

    #[inline]
    pub fn weight_count(&self) -> usize {
        self.layout.weight_count()
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.layout.neuron_count()
    }

    /// The version of the weights, bumped on every `set_weights`.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Creates a new scratch cache sized for this network.
    pub fn new_cache(&self) -> NeuronCache {
        NeuronCache::new(&self.layout)
    }

    /// Replaces the weights, keeping the topology.
    ///
    /// # Arguments
    /// * `weights` - The new flat weights.
    ///
    /// # Returns
    /// The new generation or an error if the length doesn't match.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<u64> {
        if weights.len() != self.weights.len() {
            return Err(ChainRuleErr::SizeMismatch {
                what: "weights",
                got: weights.len(),
                expected: self.weights.len(),
            });
        }

        self.weights = weights;
        self.generation += 1;
        Ok(self.generation)
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `input` - The network input.
    /// * `cache` - Scratch space receiving every neuron's sum and output.
    /// * `out` - Receives the output layer's values.
    ///
    /// # Returns
    /// An error if any of the buffers doesn't fit the network.
    pub fn compute(&self, input: &[f64], cache: &mut NeuronCache, out: &mut [f64]) -> Result<()> {
        self.check_len("input", input.len(), self.input_count())?;
        self.check_len("output buffer", out.len(), self.output_count())?;
        self.check_len("neuron cache", cache.len(), self.neuron_count())?;

        let fed = self.layout.input().fed();
        cache.outputs[fed.clone()].copy_from_slice(input);
        cache.sums[fed].copy_from_slice(input);

        for l in (0..self.layout.layer_count() - 1).rev() {
            let from = self.layout.layer(l + 1).neurons();
            let to = self.layout.layer(l);
            let block = self.layout.block(l);
            let act_fn = self.act_fns[l];

            for x in 0..to.feed {
                let sum: f64 = self.weights[block.row(x)]
                    .iter()
                    .zip(&cache.outputs[from.clone()])
                    .map(|(w, o)| w * o)
                    .sum();

                cache.sums[to.start + x] = sum;
                cache.outputs[to.start + x] = act_fn.f(sum);
            }
        }

        out.copy_from_slice(&cache.outputs[self.layout.output().fed()]);
        Ok(())
    }

    fn check_len(&self, what: &'static str, got: usize, expected: usize) -> Result<()> {
        if got != expected {
            return Err(ChainRuleErr::SizeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_like() -> FlatNetwork {
        let defs = [
            LayerDef::new(2, ActFn::linear()),
            LayerDef::new(2, ActFn::tanh()),
            LayerDef::output(1, ActFn::linear()),
        ];

        // output block: [h0, h1, bias], hidden block rows: [i0, i1, bias]
        let weights = vec![1.0, -1.0, 0.5, 0.2, 0.4, -0.1, -0.3, 0.6, 0.0];
        FlatNetwork::new(&defs, weights).unwrap()
    }

    #[test]
    fn forward_pass_matches_hand_computation() {
        let net = xor_like();
        let mut cache = net.new_cache();
        let mut out = [0.0];

        net.compute(&[1.0, 2.0], &mut cache, &mut out).unwrap();

        let h0 = (0.2 * 1.0 + 0.4 * 2.0 - 0.1_f64).tanh();
        let h1 = (-0.3 * 1.0 + 0.6 * 2.0 + 0.0_f64).tanh();
        let expected = h0 - h1 + 0.5;

        assert!((out[0] - expected).abs() < 1e-12);
        assert!((cache.outputs()[1] - h0).abs() < 1e-12);
        assert!((cache.sums()[2] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn bias_neurons_stay_at_their_activation() {
        let net = xor_like();
        let mut cache = net.new_cache();
        let mut out = [0.0];

        net.compute(&[3.0, -1.0], &mut cache, &mut out).unwrap();

        for bias in net.layout().layers().iter().filter_map(|span| span.bias()) {
            assert_eq!(cache.outputs()[bias], 1.0);
        }
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let net = xor_like();
        let mut cache = net.new_cache();
        let mut out = [0.0];

        assert!(net.compute(&[1.0], &mut cache, &mut out).is_err());
        assert!(net.compute(&[1.0, 2.0], &mut cache, &mut []).is_err());
    }

    #[test]
    fn set_weights_bumps_the_generation() {
        let mut net = xor_like();
        assert_eq!(net.generation(), 0);

        let generation = net.set_weights(vec![0.0; 9]).unwrap();
        assert_eq!(generation, 1);
        assert!(net.set_weights(vec![0.0; 3]).is_err());
        assert_eq!(net.generation(), 1);
    }

    #[test]
    fn wrong_weight_count_is_rejected() {
        let defs = [LayerDef::new(2, ActFn::linear()), LayerDef::output(1, ActFn::linear())];
        assert!(FlatNetwork::new(&defs, vec![0.0; 2]).is_err());
        assert!(FlatNetwork::new(&defs, vec![0.0; 3]).is_ok());
    }
}
