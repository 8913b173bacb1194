//! Recursive partition tree construction.
//!
//! The tree is a pure function of (dataset, metadata, selection, strategy)
//! and is rebuilt from scratch on every change. Splitting recurses until the
//! selection is exhausted, even through empty subsets, so every leaf sits at
//! depth `selection.len()` and trees for different data stay structurally
//! comparable.

use crate::data::{BinningStrategy, Dataset, FeatureDescriptor, Metadata, MetadataError};

use super::node::{PartitionNode, Tally};

/// Builds partition trees for one resolved selection.
///
/// Holds only borrowed, immutable inputs, so one builder can be shared across
/// threads and [`TreeBuilder::build`] called concurrently.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'a> {
    metadata: &'a Metadata,
    selection: Vec<&'a FeatureDescriptor>,
    strategy: BinningStrategy,
}

impl<'a> TreeBuilder<'a> {
    /// Resolve a selection against the metadata.
    ///
    /// # Errors
    ///
    /// Fails on unknown, temporal, or repeated features.
    pub fn new<S: AsRef<str>>(
        metadata: &'a Metadata,
        selection: &[S],
        strategy: BinningStrategy,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            metadata,
            selection: metadata.resolve(selection)?,
            strategy,
        })
    }

    /// Depth of every leaf.
    #[inline]
    pub fn depth(&self) -> usize {
        self.selection.len()
    }

    /// Build the tree over every row of `dataset`.
    ///
    /// # Errors
    ///
    /// Fails if the dataset's columns differ from the described ones.
    pub fn build(&self, dataset: &Dataset) -> Result<PartitionNode, MetadataError> {
        self.metadata.check_dataset(dataset)?;

        let rows = dataset.all_rows();
        let mut root = self.split_node(dataset, &rows, 0, None, None)?;
        root.sum_values();

        tracing::debug!(
            rows = dataset.n_rows(),
            depth = self.depth(),
            leaves = root.leaves().len(),
            strategy = %self.strategy,
            "built partition tree"
        );
        Ok(root)
    }

    /// Row subsets of the leaves, left to right, without tallying.
    pub(crate) fn leaf_rows(&self, dataset: &Dataset) -> Result<Vec<Vec<usize>>, MetadataError> {
        self.metadata.check_dataset(dataset)?;

        let mut groups = vec![dataset.all_rows()];
        for feature in &self.selection {
            let mut next = Vec::with_capacity(groups.len());
            for rows in &groups {
                for part in feature.split(dataset, rows, self.strategy)? {
                    next.push(part.rows);
                }
            }
            groups = next;
        }
        Ok(groups)
    }

    fn split_node(
        &self,
        dataset: &Dataset,
        rows: &[usize],
        depth: usize,
        split_feature: Option<&str>,
        split_label: Option<String>,
    ) -> Result<PartitionNode, MetadataError> {
        let tally = Tally::of_rows(self.metadata, dataset, rows);

        let (children, leaf_size) = match self.selection.get(depth) {
            Some(feature) => {
                let children = feature
                    .split(dataset, rows, self.strategy)?
                    .into_iter()
                    .map(|part| {
                        self.split_node(
                            dataset,
                            &part.rows,
                            depth + 1,
                            Some(feature.name()),
                            Some(part.label),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (Some(children), None)
            }
            None => (None, Some(tally.size)),
        };

        Ok(PartitionNode {
            tally,
            split_feature: split_feature.map(str::to_string),
            split_label,
            children,
            leaf_size,
            value: 0,
        })
    }
}

/// Build the partition tree for a selection.
///
/// # Errors
///
/// Fails on an invalid selection or a dataset whose columns differ from the
/// described ones.
pub fn build_tree<S: AsRef<str>>(
    dataset: &Dataset,
    metadata: &Metadata,
    selection: &[S],
    strategy: BinningStrategy,
) -> Result<PartitionNode, MetadataError> {
    TreeBuilder::new(metadata, selection, strategy)?.build(dataset)
}
