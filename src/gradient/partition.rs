use std::{
    num::NonZeroUsize,
    ops::{Range, RangeInclusive},
};

use log::warn;

use crate::{ChainRuleErr, Result};

/// A contiguous, inclusive range `[low, high]` of training set indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    low: usize,
    high: usize,
}

impl Partition {
    /// Creates a new `Partition`.
    ///
    /// # Arguments
    /// * `low` - The first index, inclusive.
    /// * `high` - The last index, inclusive.
    /// * `len` - The size of the training set the partition indexes into.
    ///
    /// # Returns
    /// A new partition or an error if `low > high` or `high` is out of bounds.
    pub fn new(low: usize, high: usize, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(ChainRuleErr::EmptyDataset);
        }

        if low > high || high >= len {
            return Err(ChainRuleErr::InvalidPartition { low, high, len });
        }

        Ok(Self { low, high })
    }

    /// A single partition covering the whole training set.
    pub fn whole(len: usize) -> Result<Self> {
        Self::new(0, len.saturating_sub(1), len)
    }

    /// Splits `[0, len - 1]` into balanced contiguous partitions.
    ///
    /// Sizes differ by at most one. If there are more `parts` than records, one
    /// partition per record is returned instead.
    ///
    /// # Arguments
    /// * `len` - The size of the training set.
    /// * `parts` - The desired amount of partitions.
    ///
    /// # Returns
    /// The partitions in ascending order, or an error if the training set is empty.
    pub fn split(len: usize, parts: NonZeroUsize) -> Result<Vec<Self>> {
        if len == 0 {
            return Err(ChainRuleErr::EmptyDataset);
        }

        let mut parts = parts.get();
        if parts > len {
            warn!("requested {parts} partitions for {len} records, using {len}");
            parts = len;
        }

        (0..parts)
            .map(|id| {
                let range = shard_range(len, id, parts);
                Self::new(range.start, range.end - 1, len)
            })
            .collect()
    }

    #[inline]
    pub fn low(&self) -> usize {
        self.low
    }

    #[inline]
    pub fn high(&self) -> usize {
        self.high
    }

    /// Amount of records in the partition, never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.high - self.low + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.low..=self.high
    }
}

/// Returns the `id`-th of `parts` balanced shards of `[0..total)`.
fn shard_range(total: usize, id: usize, parts: usize) -> Range<usize> {
    let base = total / parts;
    let rem = total % parts;

    let start = id * base + id.min(rem);
    let extra = usize::from(id < rem);
    start..start + base + extra
}
