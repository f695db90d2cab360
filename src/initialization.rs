use std::iter;

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{Result, network::FlatLayout};

/// How the weights of a freshly built network are drawn.
///
/// Fan-in and fan-out are taken per weight block, the fan-in counting the
/// bias neuron of the input-ward layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    Const {
        value: f64,
    },
    Uniform {
        low: f64,
        high: f64,
    },
    Normal {
        mean: f64,
        std_dev: f64,
    },
    #[default]
    XavierUniform,
    Kaiming,
}

impl WeightInit {
    /// Samples every weight of the layout.
    ///
    /// # Arguments
    /// * `layout` - The layout of the network the weights are for.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// The flat weights in storage order, or an error if a distribution is invalid.
    pub fn sample<R: Rng + ?Sized>(&self, layout: &FlatLayout, rng: &mut R) -> Result<Vec<f64>> {
        let mut weights = Vec::with_capacity(layout.weight_count());

        for block in layout.blocks() {
            let n = block.len();
            let (fan_in, fan_out) = (block.cols, block.rows);

            match *self {
                WeightInit::Const { value } => weights.extend(iter::repeat_n(value, n)),
                WeightInit::Uniform { low, high } => {
                    extend_with(&mut weights, Uniform::new(low, high)?, n, rng)
                }
                WeightInit::Normal { mean, std_dev } => {
                    extend_with(&mut weights, Normal::new(mean, std_dev)?, n, rng)
                }
                WeightInit::XavierUniform => {
                    let range = (6. / (fan_in + fan_out) as f64).sqrt();
                    extend_with(&mut weights, Uniform::new(-range, range)?, n, rng)
                }
                WeightInit::Kaiming => {
                    let std_dev = (2. / fan_in as f64).sqrt();
                    extend_with(&mut weights, Normal::new(0., std_dev)?, n, rng)
                }
            }
        }

        Ok(weights)
    }
}

fn extend_with<D, R>(weights: &mut Vec<f64>, distribution: D, n: usize, rng: &mut R)
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    for _ in 0..n {
        weights.push(distribution.sample(rng));
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{activations::ActFn, network::LayerDef};

    fn layout() -> FlatLayout {
        FlatLayout::new(&[
            LayerDef::new(3, ActFn::linear()),
            LayerDef::new(4, ActFn::sigmoid()),
            LayerDef::output(2, ActFn::sigmoid()),
        ])
        .unwrap()
    }

    #[test]
    fn const_fills_every_weight() {
        let mut rng = StdRng::seed_from_u64(0);
        let weights = WeightInit::Const { value: 0.25 }
            .sample(&layout(), &mut rng)
            .unwrap();

        assert_eq!(weights.len(), layout().weight_count());
        assert!(weights.iter().all(|&w| w == 0.25));
    }

    #[test]
    fn xavier_respects_each_block_range() {
        let layout = layout();
        let mut rng = StdRng::seed_from_u64(7);
        let weights = WeightInit::XavierUniform.sample(&layout, &mut rng).unwrap();

        for block in layout.blocks() {
            let range = (6. / (block.cols + block.rows) as f64).sqrt();
            assert!(weights[block.range()].iter().all(|w| w.abs() <= range));
        }
    }

    #[test]
    fn same_seed_same_weights() {
        let a = WeightInit::Kaiming
            .sample(&layout(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = WeightInit::Kaiming
            .sample(&layout(), &mut StdRng::seed_from_u64(42))
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn invalid_distributions_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let uniform = WeightInit::Uniform { low: 1., high: -1. };
        let normal = WeightInit::Normal {
            mean: 0.,
            std_dev: f64::NAN,
        };

        assert!(uniform.sample(&layout(), &mut rng).is_err());
        assert!(normal.sample(&layout(), &mut rng).is_err());
    }
}
