use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    ChainRuleErr, Result,
    activations::ActFn,
    dataset::InMemoryDataset,
    initialization::WeightInit,
    network::{FlatNetwork, LayerDef},
    orchestration::{ChainRuleOrchestrator, NonFinitePolicy},
};

/// The configuration of an activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
}

impl From<ActFnConfig> for ActFn {
    fn from(value: ActFnConfig) -> Self {
        match value {
            ActFnConfig::Linear => ActFn::linear(),
            ActFnConfig::Sigmoid => ActFn::sigmoid(),
            ActFnConfig::Tanh => ActFn::tanh(),
            ActFnConfig::Relu => ActFn::relu(),
        }
    }
}

/// One layer, in forward order. The last layer never gets a bias neuron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub size: usize,
    pub act_fn: ActFnConfig,
    #[serde(default = "default_bias")]
    pub bias: bool,
}

/// A training set given inline as rows of `x_size + y_size` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub data: Vec<f64>,
    pub x_size: usize,
    pub y_size: usize,
}

/// Everything needed to compute Jacobian rows from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRuleConfig {
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub init: WeightInit,
    /// Explicit weights, taking precedence over `init`.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    #[serde(default)]
    pub seed: Option<u64>,
    pub dataset: DatasetConfig,
    #[serde(default = "default_workers")]
    pub workers: NonZeroUsize,
    /// The row to compute, every row if missing.
    #[serde(default)]
    pub output_neuron: Option<usize>,
    #[serde(default)]
    pub non_finite: NonFinitePolicy,
}

impl ChainRuleConfig {
    /// Parses a JSON configuration.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ChainRuleErr::InvalidConfig(e.to_string()))
    }

    /// The layer definitions, forcing the output layer to have no bias.
    pub fn layer_defs(&self) -> Vec<LayerDef> {
        let last = self.layers.len().saturating_sub(1);

        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| LayerDef {
                size: layer.size,
                act_fn: layer.act_fn.into(),
                bias: layer.bias && i != last,
            })
            .collect()
    }

    /// Builds the network from the explicit weights or the initializer.
    pub fn build_network(&self) -> Result<FlatNetwork> {
        let defs = self.layer_defs();

        match &self.weights {
            Some(weights) => FlatNetwork::new(&defs, weights.clone()),
            None => {
                let mut rng = generate_rng(self.seed);
                FlatNetwork::build(&defs, self.init, &mut rng)
            }
        }
    }

    pub fn build_dataset(&self) -> Result<InMemoryDataset> {
        let DatasetConfig {
            data,
            x_size,
            y_size,
        } = &self.dataset;

        InMemoryDataset::new(data.clone(), *x_size, *y_size)
    }

    /// Builds an orchestrator ready to compute rows.
    pub fn build(&self) -> Result<ChainRuleOrchestrator<InMemoryDataset>> {
        let network = self.build_network()?;
        let dataset = self.build_dataset()?;

        if let Some(output_neuron) = self.output_neuron {
            if output_neuron >= network.output_count() {
                return Err(ChainRuleErr::OutputNeuronOutOfRange {
                    got: output_neuron,
                    outputs: network.output_count(),
                });
            }
        }

        let orchestrator = ChainRuleOrchestrator::new(network, dataset, self.workers)?;
        Ok(orchestrator.with_non_finite_policy(self.non_finite))
    }
}

fn default_bias() -> bool {
    true
}

fn default_workers() -> NonZeroUsize {
    NonZeroUsize::MIN
}

fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
