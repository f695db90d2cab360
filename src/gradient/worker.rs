use log::debug;

use super::Partition;
use crate::{
    ChainRuleErr, Result,
    dataset::TrainingSet,
    network::{FlatNetwork, NeuronCache},
};

/// Computes one Jacobian row, summed over a partition of the training set.
///
/// For every record of its partition the worker makes a forward pass, seeds
/// the delta of its output neuron only and propagates it back through the flat
/// layout, leaving ∂output/∂weight for every weight in `derivative`. Those are
/// summed into `tot_deriv`, and weighted by the output's error into `gradients`.
///
/// The network and the training set are only borrowed: the forward pass writes
/// into the worker's own `NeuronCache`, so any amount of workers can run over
/// the same network at once.
pub struct GradientWorker<'a, D: TrainingSet> {
    network: &'a FlatNetwork,
    training: &'a D,
    partition: Partition,
    output_neuron: usize,
    generation: u64,

    cache: NeuronCache,
    actual: Vec<f64>,
    layer_delta: Vec<f64>,
    derivative: Vec<f64>,
    tot_deriv: Vec<f64>,
    gradients: Vec<f64>,
    error: f64,
}

impl<'a, D: TrainingSet> GradientWorker<'a, D> {
    /// Creates a new `GradientWorker`.
    ///
    /// # Arguments
    /// * `network` - The flat network to differentiate.
    /// * `training` - The training set the partition indexes into.
    /// * `partition` - The records this worker is responsible for.
    /// * `output_neuron` - The output whose Jacobian row is computed.
    ///
    /// # Returns
    /// A new worker or a configuration error if any of the pieces don't fit together.
    pub fn new(
        network: &'a FlatNetwork,
        training: &'a D,
        partition: Partition,
        output_neuron: usize,
    ) -> Result<Self> {
        if training.input_size() != network.input_count() {
            return Err(ChainRuleErr::SizeMismatch {
                what: "training inputs",
                got: training.input_size(),
                expected: network.input_count(),
            });
        }

        if training.ideal_size() != network.output_count() {
            return Err(ChainRuleErr::SizeMismatch {
                what: "training ideals",
                got: training.ideal_size(),
                expected: network.output_count(),
            });
        }

        if partition.high() >= training.len() {
            return Err(ChainRuleErr::InvalidPartition {
                low: partition.low(),
                high: partition.high(),
                len: training.len(),
            });
        }

        check_output_neuron(output_neuron, network.output_count())?;

        let weights = network.weight_count();

        Ok(Self {
            network,
            training,
            partition,
            output_neuron,
            generation: network.generation(),
            cache: network.new_cache(),
            actual: vec![0.; network.output_count()],
            layer_delta: vec![0.; network.neuron_count()],
            derivative: vec![0.; weights],
            tot_deriv: vec![0.; weights],
            gradients: vec![0.; weights],
            error: 0.,
        })
    }

    /// Differentiates every record of the partition, in ascending order.
    ///
    /// The accumulators are reset first, so calling this again recomputes the
    /// same values.
    pub fn run(&mut self) -> Result<()> {
        self.error = 0.;
        self.tot_deriv.fill(0.);
        self.gradients.fill(0.);

        let training = self.training;
        for i in self.partition.indices() {
            let (input, ideal) = training.record(i);
            self.derivative.fill(0.);
            self.process(input, ideal)?;
        }

        debug!(
            low = self.partition.low(),
            high = self.partition.high(),
            output_neuron = self.output_neuron;
            "partition differentiated, error={}",
            self.error
        );

        Ok(())
    }

    fn process(&mut self, input: &[f64], ideal: &[f64]) -> Result<()> {
        let network = self.network;
        network.compute(input, &mut self.cache, &mut self.actual)?;

        let e = ideal[self.output_neuron] - self.actual[self.output_neuron];
        self.error += e * e;

        let outputs = network.layout().output();
        let (sums, activations) = (self.cache.sums(), self.cache.outputs());
        for i in 0..outputs.feed {
            let n = outputs.start + i;
            self.layer_delta[n] = if i == self.output_neuron {
                network.activation_derivative(0, sums[n], activations[n])
            } else {
                0.
            };
        }

        for level in 0..network.layout().layer_count() - 1 {
            self.process_level(level);
        }

        for ((g, t), d) in self
            .gradients
            .iter_mut()
            .zip(self.tot_deriv.iter_mut())
            .zip(&self.derivative)
        {
            *g += e * d;
            *t += d;
        }

        Ok(())
    }

    /// Pushes the deltas of layer `level` back into layer `level + 1`, adding
    /// the derivative of every weight in between.
    fn process_level(&mut self, level: usize) {
        let network = self.network;
        let layout = network.layout();
        let weights = network.weights();

        let from = layout.layer(level + 1);
        let to = layout.layer(level);
        let block = layout.block(level);
        let (sums, outputs) = (self.cache.sums(), self.cache.outputs());

        for y in 0..from.count {
            let yi = from.start + y;
            let output = outputs[yi];
            let mut sum = 0.;

            for x in 0..to.feed {
                let wi = block.index(x, y);
                let delta = self.layer_delta[to.start + x];

                self.derivative[wi] += output * delta;
                sum += weights[wi] * delta;
            }

            self.layer_delta[yi] =
                sum * network.activation_derivative(level + 1, sums[yi], outputs[yi]);
        }
    }

    /// The error weighted gradient, `Σ e * ∂output/∂w` over the partition.
    #[inline]
    pub fn gradients(&self) -> &[f64] {
        &self.gradients
    }

    /// The Jacobian row summed over the partition, `Σ ∂output/∂w`.
    #[inline]
    pub fn derivative(&self) -> &[f64] {
        &self.tot_deriv
    }

    /// The squared error of the output neuron summed over the partition.
    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }

    #[inline]
    pub fn output_neuron(&self) -> usize {
        self.output_neuron
    }

    /// Selects which output's Jacobian row the next `run` computes.
    pub fn set_output_neuron(&mut self, output_neuron: usize) -> Result<()> {
        check_output_neuron(output_neuron, self.network.output_count())?;
        self.output_neuron = output_neuron;
        Ok(())
    }

    #[inline]
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// The weight generation of the network this worker is bound to.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn check_output_neuron(output_neuron: usize, outputs: usize) -> Result<()> {
    if output_neuron >= outputs {
        return Err(ChainRuleErr::OutputNeuronOutOfRange {
            got: output_neuron,
            outputs,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{activations::ActFn, dataset::InMemoryDataset, network::LayerDef};

    fn network() -> FlatNetwork {
        let defs = [
            LayerDef::new(2, ActFn::linear()),
            LayerDef::new(2, ActFn::sigmoid()),
            LayerDef::output(1, ActFn::sigmoid()),
        ];
        let weights = vec![0.3, -0.8, 0.1, 0.5, -0.4, 0.2, 0.9, 0.7, -0.6];
        FlatNetwork::new(&defs, weights).unwrap()
    }

    fn dataset() -> InMemoryDataset {
        InMemoryDataset::new(
            vec![0., 0., 0., 0., 1., 1., 1., 0., 1., 1., 1., 0.],
            2,
            1,
        )
        .unwrap()
    }

    #[test]
    fn single_record_partition_sums_its_own_derivative() {
        let net = network();
        let ds = dataset();
        let partition = Partition::new(2, 2, ds.len()).unwrap();
        let mut worker = GradientWorker::new(&net, &ds, partition, 0).unwrap();

        worker.run().unwrap();

        let mut actual = [0.];
        net.compute(ds.record(2).0, &mut net.new_cache(), &mut actual)
            .unwrap();
        let e = ds.record(2).1[0] - actual[0];

        assert!((worker.error() - e * e).abs() < 1e-15);
        for (g, d) in worker.gradients().iter().zip(worker.derivative()) {
            assert!((g - e * d).abs() < 1e-15);
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let net = network();
        let ds = dataset();
        let mut worker = GradientWorker::new(&net, &ds, Partition::whole(4).unwrap(), 0).unwrap();

        worker.run().unwrap();
        let (grad, deriv, error) = (
            worker.gradients().to_vec(),
            worker.derivative().to_vec(),
            worker.error(),
        );

        worker.run().unwrap();
        assert_eq!(worker.gradients(), grad.as_slice());
        assert_eq!(worker.derivative(), deriv.as_slice());
        assert_eq!(worker.error().to_bits(), error.to_bits());
    }

    #[test]
    fn output_layer_bias_weight_gets_the_output_delta() {
        let net = network();
        let ds = dataset();
        let partition = Partition::new(0, 0, ds.len()).unwrap();
        let mut worker = GradientWorker::new(&net, &ds, partition, 0).unwrap();

        worker.run().unwrap();

        let mut cache = net.new_cache();
        let mut actual = [0.];
        net.compute(ds.record(0).0, &mut cache, &mut actual).unwrap();
        let delta = actual[0] * (1. - actual[0]);

        // the last weight of the output block connects the hidden bias neuron
        let bias_weight = net.layout().block(0).index(0, 2);
        assert!((worker.derivative()[bias_weight] - delta).abs() < 1e-15);
    }

    #[test]
    fn misconfigured_workers_are_rejected() {
        let net = network();
        let ds = dataset();
        let whole = Partition::whole(ds.len()).unwrap();

        assert!(matches!(
            GradientWorker::new(&net, &ds, whole, 1),
            Err(ChainRuleErr::OutputNeuronOutOfRange { got: 1, outputs: 1 })
        ));

        let longer = Partition::whole(10).unwrap();
        assert!(GradientWorker::new(&net, &ds, longer, 0).is_err());

        let wide = InMemoryDataset::new(vec![0.; 8], 3, 1).unwrap();
        assert!(GradientWorker::new(&net, &wide, Partition::whole(2).unwrap(), 0).is_err());

        let mut worker = GradientWorker::new(&net, &ds, whole, 0).unwrap();
        assert!(worker.set_output_neuron(3).is_err());
        assert_eq!(worker.output_neuron(), 0);
    }
}
