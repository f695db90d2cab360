use std::num::NonZeroUsize;

use chain_rule::{
    ActFn, Aggregate, ChainRuleOrchestrator, FlatNetwork, GradientWorker, InMemoryDataset,
    LayerDef, Partition, TrainingSet,
};

fn network() -> FlatNetwork {
    let defs = [
        LayerDef::new(2, ActFn::linear()),
        LayerDef::new(3, ActFn::tanh()),
        LayerDef::output(2, ActFn::sigmoid()),
    ];
    let weights = (0..2 * 4 + 3 * 3)
        .map(|i| ((i * 13 % 17) as f64 - 8.) / 10.)
        .collect();
    FlatNetwork::new(&defs, weights).unwrap()
}

fn dataset(records: usize) -> InMemoryDataset {
    let data = (0..records)
        .flat_map(|i| {
            let x = i as f64 / records as f64;
            [x, 1. - x, x * x, 0.5]
        })
        .collect();
    InMemoryDataset::new(data, 2, 2).unwrap()
}

fn orchestrator(workers: usize) -> ChainRuleOrchestrator<InMemoryDataset> {
    ChainRuleOrchestrator::new(network(), dataset(10), NonZeroUsize::new(workers).unwrap())
        .unwrap()
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-12, "{x} != {y}");
    }
}

#[test]
fn partitioned_rows_sum_to_the_whole_dataset_row() {
    let whole = orchestrator(1);

    for workers in [2, 3, 4, 10] {
        let split = orchestrator(workers);

        for output_neuron in 0..2 {
            let expected = whole.compute_row(output_neuron).unwrap();
            let got = split.compute_row(output_neuron).unwrap();

            assert_eq!(got.partitions(), workers);
            assert_close(got.derivative(), expected.derivative());
            assert_close(got.gradients(), expected.gradients());
            assert!((got.error() - expected.error()).abs() < 1e-12);
        }
    }
}

#[test]
fn parallel_pass_matches_sequential_absorption_bit_for_bit() {
    let orch = orchestrator(3);
    let parallel = orch.compute_row(1).unwrap();

    let net = orch.network();
    let ds = orch.training();
    let mut sequential = Aggregate::new(net.weight_count(), 1, net.generation());
    for partition in Partition::split(ds.len(), NonZeroUsize::new(3).unwrap()).unwrap() {
        let mut worker = GradientWorker::new(net, ds, partition, 1).unwrap();
        worker.run().unwrap();
        sequential.absorb(&worker).unwrap();
    }

    assert_eq!(parallel, sequential);
}

#[test]
fn arbitrary_disjoint_partitions_cover_the_dataset() {
    let net = network();
    let ds = dataset(7);
    let cuts = [(0, 0), (1, 4), (5, 6)];

    let mut whole = GradientWorker::new(&net, &ds, Partition::whole(7).unwrap(), 0).unwrap();
    whole.run().unwrap();

    let mut parts = Aggregate::new(net.weight_count(), 0, net.generation());
    for (low, high) in cuts {
        let partition = Partition::new(low, high, ds.len()).unwrap();
        let mut worker = GradientWorker::new(&net, &ds, partition, 0).unwrap();
        worker.run().unwrap();
        parts.absorb(&worker).unwrap();
    }

    assert_close(parts.derivative(), whole.derivative());
    assert_close(parts.gradients(), whole.gradients());
    assert!((parts.error() - whole.error()).abs() < 1e-12);
}
