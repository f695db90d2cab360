use crate::{ChainRuleErr, Result};

/// Random access to training pairs.
pub trait TrainingSet {
    /// Amount of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of every input vector.
    fn input_size(&self) -> usize;

    /// Width of every ideal vector.
    fn ideal_size(&self) -> usize;

    /// Returns the `(input, ideal)` pair at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    fn record(&self, index: usize) -> (&[f64], &[f64]);
}

/// A training set held in memory as rows of `x_size + y_size` values.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryDataset {
    x_size: usize,
    y_size: usize,
    data: Vec<f64>,
}

impl InMemoryDataset {
    /// Creates a new `InMemoryDataset`.
    ///
    /// # Arguments
    /// * `data` - The rows, each one an input followed by its ideal output.
    /// * `x_size` - The width of the inputs.
    /// * `y_size` - The width of the ideal outputs.
    ///
    /// # Returns
    /// A new dataset or an error if the data is empty or ragged.
    pub fn new(data: Vec<f64>, x_size: usize, y_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 {
            return Err(ChainRuleErr::InvalidConfig(format!(
                "dataset rows need a non empty input and ideal, got x_size={x_size} y_size={y_size}"
            )));
        }

        if data.is_empty() {
            return Err(ChainRuleErr::EmptyDataset);
        }

        let row = x_size + y_size;
        if data.len() % row != 0 {
            return Err(ChainRuleErr::InvalidConfig(format!(
                "dataset length ({}) is not divisible by x_size + y_size ({row})",
                data.len()
            )));
        }

        Ok(Self {
            x_size,
            y_size,
            data,
        })
    }

    /// Creates a new `InMemoryDataset` from separate inputs and ideals.
    pub fn from_pairs<'p, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'p [f64], &'p [f64])>,
    {
        let mut pairs = pairs.into_iter().peekable();
        let (x_size, y_size) = pairs
            .peek()
            .map(|(x, y)| (x.len(), y.len()))
            .ok_or(ChainRuleErr::EmptyDataset)?;

        let mut data = Vec::new();
        for (i, (x, y)) in pairs.enumerate() {
            if x.len() != x_size || y.len() != y_size {
                return Err(ChainRuleErr::InvalidConfig(format!(
                    "record {i} has shape ({}, {}), expected ({x_size}, {y_size})",
                    x.len(),
                    y.len()
                )));
            }

            data.extend_from_slice(x);
            data.extend_from_slice(y);
        }

        Self::new(data, x_size, y_size)
    }
}

impl TrainingSet for InMemoryDataset {
    fn len(&self) -> usize {
        self.data.len() / (self.x_size + self.y_size)
    }

    fn input_size(&self) -> usize {
        self.x_size
    }

    fn ideal_size(&self) -> usize {
        self.y_size
    }

    fn record(&self, index: usize) -> (&[f64], &[f64]) {
        let row = self.x_size + self.y_size;
        let start = index * row;
        self.data[start..start + row].split_at(self.x_size)
    }
}
