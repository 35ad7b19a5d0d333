//! Deterministic round-robin partitioning of work items
//!
//! Item `i` of a sequence of `count` items is owned by partition
//! `i % partition_count`. For a fixed `count` and `partition_count` the
//! partitions are disjoint, each is ascending, and together they cover
//! `0..count` exactly once. All functions here are pure.

use crate::error::{Error, Result};
use std::iter::FusedIterator;

/// Validated `(count, partition_count, partition_index)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionDescriptor {
    count: usize,
    partition_count: usize,
    partition_index: usize,
}

impl PartitionDescriptor {
    /// Validate the triple.
    ///
    /// Fails with [`Error::InvalidArgument`] when `partition_count` is zero or
    /// `partition_index` is not below `partition_count`.
    pub fn new(count: usize, partition_count: usize, partition_index: usize) -> Result<Self> {
        if partition_count == 0 {
            return Err(Error::invalid_argument(
                "partition_count must be at least 1",
            ));
        }
        if partition_index >= partition_count {
            return Err(Error::invalid_argument(format!(
                "partition_index {partition_index} out of range for {partition_count} partitions"
            )));
        }
        Ok(Self {
            count,
            partition_count,
            partition_index,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    pub fn partition_index(&self) -> usize {
        self.partition_index
    }

    /// Number of items owned by this partition
    pub fn len(&self) -> usize {
        if self.partition_index >= self.count {
            0
        } else {
            (self.count - self.partition_index - 1) / self.partition_count + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily iterate the owned item indices in ascending order
    pub fn iter(&self) -> RoundRobinPart {
        RoundRobinPart {
            next: Some(self.partition_index).filter(|&i| i < self.count),
            count: self.count,
            step: self.partition_count,
        }
    }
}

impl IntoIterator for PartitionDescriptor {
    type Item = usize;
    type IntoIter = RoundRobinPart;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the item indices owned by one partition
#[derive(Debug, Clone)]
pub struct RoundRobinPart {
    next: Option<usize>,
    count: usize,
    step: usize,
}

impl Iterator for RoundRobinPart {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = current
            .checked_add(self.step)
            .filter(|&i| i < self.count);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(i) => (self.count - i - 1) / self.step + 1,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RoundRobinPart {}

impl FusedIterator for RoundRobinPart {}

/// Indices in `0..count` owned by `partition_index` under round-robin distribution.
///
/// ```rust
/// # use clusterkit::partition::round_robin_part;
/// assert_eq!(round_robin_part(3, 2, 0).unwrap(), vec![0, 2]);
/// assert_eq!(round_robin_part(3, 2, 1).unwrap(), vec![1]);
/// assert!(round_robin_part(3, 0, 0).is_err());
/// ```
pub fn round_robin_part(
    count: usize,
    partition_count: usize,
    partition_index: usize,
) -> Result<Vec<usize>> {
    let descriptor = PartitionDescriptor::new(count, partition_count, partition_index)?;
    Ok(descriptor.iter().collect())
}

/// Every partition of `0..count`, indexed by partition
pub fn round_robin_partitions(count: usize, partition_count: usize) -> Result<Vec<Vec<usize>>> {
    (0..partition_count.max(1))
        .map(|index| round_robin_part(count, partition_count, index))
        .collect()
}
