//! Renderer-facing payloads.
//!
//! Renderers receive a [`VisualizationInput`] and never mutate it; a new
//! payload is built whenever the dataset, selection, or strategy changes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{BinningStrategy, Dataset, Metadata, MetadataError};
use crate::tree::{build_tree, PartitionNode};

/// Available hierarchy renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    #[default]
    Icicle,
    #[serde(rename = "nodelink")]
    NodeLink,
    Matrix,
}

impl VisualizationKind {
    pub const ALL: [VisualizationKind; 3] = [
        VisualizationKind::Icicle,
        VisualizationKind::NodeLink,
        VisualizationKind::Matrix,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisualizationKind::Icicle => "icicle",
            VisualizationKind::NodeLink => "nodelink",
            VisualizationKind::Matrix => "matrix",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown visualization kind: {0:?}")]
pub struct UnknownVisualization(pub String);

impl FromStr for VisualizationKind {
    type Err = UnknownVisualization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownVisualization(s.to_string()))
    }
}

/// The payload handed to a renderer: descriptors plus the partition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationInput {
    pub metadata: Arc<Metadata>,
    pub data: PartitionNode,
}

impl VisualizationInput {
    /// Build the tree for `selection` and bundle it with `metadata`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid selection or mismatched dataset.
    pub fn new<S: AsRef<str>>(
        dataset: &Dataset,
        metadata: Arc<Metadata>,
        selection: &[S],
        strategy: BinningStrategy,
    ) -> Result<Self, MetadataError> {
        let data = build_tree(dataset, &metadata, selection, strategy)?;
        Ok(Self { metadata, data })
    }
}
