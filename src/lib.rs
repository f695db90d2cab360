pub mod activations;
pub mod config;
pub mod dataset;
mod error;
pub mod gradient;
pub mod initialization;
pub mod network;
pub mod orchestration;

pub use activations::ActFn;
pub use config::ChainRuleConfig;
pub use dataset::{InMemoryDataset, TrainingSet};
pub use error::{ChainRuleErr, Result};
pub use gradient::{GradientWorker, Partition};
pub use initialization::WeightInit;
pub use network::{FlatNetwork, LayerDef, NeuronCache};
pub use orchestration::{Aggregate, ChainRuleOrchestrator, NonFinitePolicy};
