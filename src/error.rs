use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, ChainRuleErr>;

/// The crate's error type.
///
/// Every variant but `NonFinite` is a configuration error, raised while binding
/// networks, datasets and workers together and never in the middle of a pass.
#[derive(Debug)]
pub enum ChainRuleErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidTopology(String),
    InvalidPartition {
        low: usize,
        high: usize,
        len: usize,
    },
    OutputNeuronOutOfRange {
        got: usize,
        outputs: usize,
    },
    OutputNeuronMismatch {
        got: usize,
        expected: usize,
    },
    EmptyDataset,
    InvalidDistribution(String),
    GenerationMismatch {
        got: u64,
        expected: u64,
    },
    NonFinite {
        output_neuron: usize,
        what: &'static str,
    },
    InvalidConfig(String),
}

impl Display for ChainRuleErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainRuleErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}: got {got}, expected {expected}"),
            ChainRuleErr::InvalidTopology(msg) => write!(f, "invalid topology: {msg}"),
            ChainRuleErr::InvalidPartition { low, high, len } => write!(
                f,
                "invalid partition [{low}, {high}] for a training set of {len} records"
            ),
            ChainRuleErr::OutputNeuronOutOfRange { got, outputs } => write!(
                f,
                "output neuron {got} is out of range, the network has {outputs} outputs"
            ),
            ChainRuleErr::OutputNeuronMismatch { got, expected } => write!(
                f,
                "cannot add the row of output neuron {got} to the row of output neuron {expected}"
            ),
            ChainRuleErr::EmptyDataset => f.write_str("the training set is empty"),
            ChainRuleErr::InvalidDistribution(msg) => {
                write!(f, "invalid weight distribution: {msg}")
            }
            ChainRuleErr::GenerationMismatch { got, expected } => write!(
                f,
                "weight generation mismatch: got {got}, expected {expected}"
            ),
            ChainRuleErr::NonFinite {
                output_neuron,
                what,
            } => write!(
                f,
                "non finite {what} while differentiating output neuron {output_neuron}"
            ),
            ChainRuleErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ChainRuleErr {}

impl From<NormalError> for ChainRuleErr {
    fn from(value: NormalError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

impl From<UniformError> for ChainRuleErr {
    fn from(value: UniformError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}
