//! Partition trees.
//!
//! - [`TreeBuilder`] / [`build_tree`] - recursive split by a feature selection
//! - [`PartitionNode`] - aggregate node with label and prediction tallies
//! - [`flatten_leaves`] / [`LeafAggregate`] - deepest level as a flat list

mod builder;
mod leaves;
mod node;

pub use builder::{build_tree, TreeBuilder};
pub use leaves::{flatten_leaves, get_data, LeafAggregate};
pub use node::{Counts, CountsView, Descendants, Outcome, PartitionNode, PredictionResults, Tally};
