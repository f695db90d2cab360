use std::num::NonZeroUsize;

use log::{info, warn};
use rayon::prelude::*;

use super::{Aggregate, NonFinitePolicy};
use crate::{
    Result,
    dataset::TrainingSet,
    gradient::{GradientWorker, Partition},
    network::FlatNetwork,
};

/// Splits a training set across gradient workers, runs them in parallel and
/// sums their results.
///
/// Workers borrow the network for the duration of a pass, so the weights can
/// only be swapped through `set_weights` once every pass has finished.
pub struct ChainRuleOrchestrator<D: TrainingSet> {
    network: FlatNetwork,
    training: D,
    partitions: Vec<Partition>,
    non_finite: NonFinitePolicy,
}

impl<D: TrainingSet + Sync> ChainRuleOrchestrator<D> {
    /// Creates a new `ChainRuleOrchestrator`.
    ///
    /// # Arguments
    /// * `network` - The network to differentiate.
    /// * `training` - The training set.
    /// * `workers` - The amount of partitions to split the training set into.
    ///
    /// # Returns
    /// A new orchestrator or a configuration error.
    pub fn new(network: FlatNetwork, training: D, workers: NonZeroUsize) -> Result<Self> {
        let partitions = Partition::split(training.len(), workers)?;

        let orchestrator = Self {
            network,
            training,
            partitions,
            non_finite: NonFinitePolicy::default(),
        };

        // surfaces shape mismatches before the first pass
        orchestrator.workers(0)?;
        Ok(orchestrator)
    }

    /// Sets what happens when a pass produces NaNs or infinities.
    pub fn with_non_finite_policy(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    #[inline]
    pub fn network(&self) -> &FlatNetwork {
        &self.network
    }

    #[inline]
    pub fn training(&self) -> &D {
        &self.training
    }

    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Builds one worker per partition, all bound to `output_neuron`.
    pub fn workers(&self, output_neuron: usize) -> Result<Vec<GradientWorker<'_, D>>> {
        self.partitions
            .iter()
            .map(|&partition| {
                GradientWorker::new(&self.network, &self.training, partition, output_neuron)
            })
            .collect()
    }

    /// Computes the Jacobian row of `output_neuron` over the whole training set.
    pub fn compute_row(&self, output_neuron: usize) -> Result<Aggregate> {
        let mut workers = self.workers(output_neuron)?;
        self.run_workers(&mut workers, output_neuron)
    }

    /// Computes the Jacobian row of every output neuron, one pass each.
    ///
    /// The same workers are reused across passes.
    pub fn compute_rows(&self) -> Result<Vec<Aggregate>> {
        let mut workers = self.workers(0)?;

        (0..self.network.output_count())
            .map(|output_neuron| {
                for worker in workers.iter_mut() {
                    worker.set_output_neuron(output_neuron)?;
                }

                self.run_workers(&mut workers, output_neuron)
            })
            .collect()
    }

    /// Replaces the network's weights between passes.
    ///
    /// # Returns
    /// The new weight generation.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<u64> {
        let generation = self.network.set_weights(weights)?;
        info!("weights replaced, generation={generation}");
        Ok(generation)
    }

    fn run_workers(
        &self,
        workers: &mut [GradientWorker<'_, D>],
        output_neuron: usize,
    ) -> Result<Aggregate> {
        workers.par_iter_mut().try_for_each(|worker| worker.run())?;

        let mut aggregate = Aggregate::new(
            self.network.weight_count(),
            output_neuron,
            self.network.generation(),
        );

        for worker in workers.iter() {
            aggregate.absorb(worker)?;
        }

        if let Err(e) = aggregate.check_finite() {
            match self.non_finite {
                NonFinitePolicy::Abort => return Err(e),
                NonFinitePolicy::Warn => warn!("{e}"),
            }
        }

        info!(
            output_neuron = output_neuron,
            partitions = aggregate.partitions(),
            generation = aggregate.generation();
            "jacobian row computed, error={}",
            aggregate.error()
        );

        Ok(aggregate)
    }
}

impl<D: TrainingSet> std::fmt::Debug for ChainRuleOrchestrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRuleOrchestrator")
            .field("network", &self.network)
            .field("records", &self.training.len())
            .field("partitions", &self.partitions)
            .field("non_finite", &self.non_finite)
            .finish()
    }
}
