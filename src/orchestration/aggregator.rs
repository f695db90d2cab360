use serde::Serialize;

use crate::{ChainRuleErr, Result, dataset::TrainingSet, gradient::GradientWorker};

/// Dataset-wide totals of one Jacobian row, summed over disjoint partitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    output_neuron: usize,
    generation: u64,
    partitions: usize,
    error: f64,
    gradients: Vec<f64>,
    derivative: Vec<f64>,
}

impl Aggregate {
    /// Creates a new, empty `Aggregate`.
    ///
    /// # Arguments
    /// * `weight_count` - The amount of weights of the network.
    /// * `output_neuron` - The output whose row is being summed.
    /// * `generation` - The weight generation every absorbed worker must share.
    pub fn new(weight_count: usize, output_neuron: usize, generation: u64) -> Self {
        Self {
            output_neuron,
            generation,
            partitions: 0,
            error: 0.,
            gradients: vec![0.; weight_count],
            derivative: vec![0.; weight_count],
        }
    }

    /// Adds a finished worker's accumulators to the totals.
    ///
    /// # Returns
    /// An error if the worker differentiated another output, another weight
    /// generation or a network of a different size.
    pub fn absorb<D: TrainingSet>(&mut self, worker: &GradientWorker<'_, D>) -> Result<()> {
        if worker.output_neuron() != self.output_neuron {
            return Err(ChainRuleErr::OutputNeuronMismatch {
                got: worker.output_neuron(),
                expected: self.output_neuron,
            });
        }

        if worker.generation() != self.generation {
            return Err(ChainRuleErr::GenerationMismatch {
                got: worker.generation(),
                expected: self.generation,
            });
        }

        if worker.gradients().len() != self.gradients.len() {
            return Err(ChainRuleErr::SizeMismatch {
                what: "worker gradients",
                got: worker.gradients().len(),
                expected: self.gradients.len(),
            });
        }

        add_assign(&mut self.gradients, worker.gradients());
        add_assign(&mut self.derivative, worker.derivative());
        self.error += worker.error();
        self.partitions += 1;
        Ok(())
    }

    #[inline]
    pub fn output_neuron(&self) -> usize {
        self.output_neuron
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Amount of worker results absorbed so far.
    #[inline]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }

    #[inline]
    pub fn gradients(&self) -> &[f64] {
        &self.gradients
    }

    #[inline]
    pub fn derivative(&self) -> &[f64] {
        &self.derivative
    }

    pub fn is_finite(&self) -> bool {
        self.check_finite().is_ok()
    }

    /// Reports the first quantity holding a NaN or an infinity.
    pub fn check_finite(&self) -> Result<()> {
        let non_finite = |what| ChainRuleErr::NonFinite {
            output_neuron: self.output_neuron,
            what,
        };

        if !self.error.is_finite() {
            return Err(non_finite("error"));
        }

        if !self.gradients.iter().all(|g| g.is_finite()) {
            return Err(non_finite("gradients"));
        }

        if !self.derivative.iter().all(|d| d.is_finite()) {
            return Err(non_finite("derivative"));
        }

        Ok(())
    }
}

fn add_assign(acc: &mut [f64], values: &[f64]) {
    acc.iter_mut().zip(values).for_each(|(a, v)| *a += v);
}
