//! Flat leaf view of a partition tree.
//!
//! This is the shape the suggestion engine scores and the store layer hands
//! to renderers that only need the deepest level.

use serde::{Deserialize, Serialize};

use crate::data::{BinningStrategy, Dataset, Metadata, MetadataError};

use super::builder::TreeBuilder;
use super::node::{PartitionNode, Tally};

/// Aggregates of one leaf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafAggregate(pub Tally);

impl LeafAggregate {
    /// Rows in the leaf.
    #[inline]
    pub fn size(&self) -> usize {
        self.0.size
    }

    /// Incorrect predictions in the leaf; 0 without predictions.
    #[inline]
    pub fn incorrect(&self) -> usize {
        self.0.incorrect()
    }

    /// The leaf's tallies.
    #[inline]
    pub fn tally(&self) -> &Tally {
        &self.0
    }
}

impl From<&PartitionNode> for LeafAggregate {
    fn from(node: &PartitionNode) -> Self {
        Self(node.tally.clone())
    }
}

/// Leaves of the tree for `selection`, left to right.
///
/// # Errors
///
/// Fails on an invalid selection or a dataset whose columns differ from the
/// described ones.
pub fn flatten_leaves<S: AsRef<str>>(
    metadata: &Metadata,
    selection: &[S],
    dataset: &Dataset,
    strategy: BinningStrategy,
) -> Result<Vec<LeafAggregate>, MetadataError> {
    let tree = TreeBuilder::new(metadata, selection, strategy)?.build(dataset)?;
    Ok(tree.leaves().into_iter().map(LeafAggregate::from).collect())
}

/// Aggregate view handed to the store layer; same as [`flatten_leaves`].
pub fn get_data<S: AsRef<str>>(
    metadata: &Metadata,
    selected: &[S],
    dataset: &Dataset,
    strategy: BinningStrategy,
) -> Result<Vec<LeafAggregate>, MetadataError> {
    flatten_leaves(metadata, selected, dataset, strategy)
}
