use std::ops::Range;

use super::LayerDef;
use crate::{ChainRuleErr, Result};

/// The neurons of one layer inside the flat neuron buffers.
///
/// Bias neurons, when present, sit right after the fed neurons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpan {
    /// Offset of the layer's first neuron.
    pub start: usize,
    /// Amount of neurons, bias included.
    pub count: usize,
    /// Amount of neurons fed by the previous layer, bias excluded.
    pub feed: usize,
}

impl LayerSpan {
    /// Every neuron of the layer.
    #[inline]
    pub fn neurons(&self) -> Range<usize> {
        self.start..self.start + self.count
    }

    /// The neurons that receive a weighted sum.
    #[inline]
    pub fn fed(&self) -> Range<usize> {
        self.start..self.start + self.feed
    }

    /// The flat index of the bias neuron, if the layer has one.
    #[inline]
    pub fn bias(&self) -> Option<usize> {
        (self.count > self.feed).then_some(self.start + self.feed)
    }
}

/// The weights connecting layer `l + 1` to layer `l` inside the flat weight buffer.
///
/// Row `x` holds the weights feeding neuron `x` of layer `l`, one column per
/// neuron of layer `l + 1` (bias included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightBlock {
    pub start: usize,
    pub rows: usize,
    pub cols: usize,
}

impl WeightBlock {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len()
    }

    /// The weights feeding the `x`-th neuron of the output-ward layer.
    #[inline]
    pub fn row(&self, x: usize) -> Range<usize> {
        let start = self.start + x * self.cols;
        start..start + self.cols
    }

    /// The flat index of the weight going from neuron `y` to neuron `x`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.start + x * self.cols + y
    }
}

/// Offsets and shapes of a flat network.
///
/// Layers are numbered from the output: layer `0` is the output layer and the
/// last one is the input layer. Block `l` holds the weights from layer `l + 1`
/// into layer `l`, and blocks are stored in that same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLayout {
    layers: Vec<LayerSpan>,
    blocks: Vec<WeightBlock>,
    neuron_count: usize,
    weight_count: usize,
}

impl FlatLayout {
    /// Packs the given layers.
    ///
    /// # Arguments
    /// * `defs` - The layers in forward order, the input layer first.
    ///
    /// # Returns
    /// The layout or an error if the topology is malformed.
    pub fn new(defs: &[LayerDef]) -> Result<Self> {
        if defs.len() < 2 {
            return Err(ChainRuleErr::InvalidTopology(format!(
                "a network needs at least an input and an output layer, got {} layers",
                defs.len()
            )));
        }

        if let Some(i) = defs.iter().position(|def| def.size == 0) {
            return Err(ChainRuleErr::InvalidTopology(format!(
                "layer {i} has no neurons"
            )));
        }

        if defs.last().is_some_and(|def| def.bias) {
            return Err(ChainRuleErr::InvalidTopology(
                "the output layer cannot have a bias neuron".into(),
            ));
        }

        let mut neuron_count = 0;
        let layers: Vec<_> = defs
            .iter()
            .rev()
            .map(|def| {
                let span = LayerSpan {
                    start: neuron_count,
                    count: def.size + def.bias as usize,
                    feed: def.size,
                };

                neuron_count += span.count;
                span
            })
            .collect();

        let mut weight_count = 0;
        let blocks = layers
            .windows(2)
            .map(|pair| {
                let block = WeightBlock {
                    start: weight_count,
                    rows: pair[0].feed,
                    cols: pair[1].count,
                };

                weight_count += block.len();
                block
            })
            .collect();

        Ok(Self {
            layers,
            blocks,
            neuron_count,
            weight_count,
        })
    }

    /// Amount of layers, input and output included.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layer(&self, l: usize) -> &LayerSpan {
        &self.layers[l]
    }

    #[inline]
    pub fn layers(&self) -> &[LayerSpan] {
        &self.layers
    }

    #[inline]
    pub fn block(&self, l: usize) -> &WeightBlock {
        &self.blocks[l]
    }

    #[inline]
    pub fn blocks(&self) -> &[WeightBlock] {
        &self.blocks
    }

    #[inline]
    pub fn output(&self) -> &LayerSpan {
        &self.layers[0]
    }

    #[inline]
    pub fn input(&self) -> &LayerSpan {
        &self.layers[self.layers.len() - 1]
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    #[inline]
    pub fn weight_count(&self) -> usize {
        self.weight_count
    }
}
