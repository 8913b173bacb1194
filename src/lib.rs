//! featuretree: hierarchical partitioning of labeled tabular data.
//!
//! A labeled dataset is partitioned recursively by an ordered selection of
//! features. Quantitative features are discretized into ordinal bins,
//! categorical features split by distinct value. Every node of the resulting
//! [`PartitionNode`] tree carries the label (and optional prediction)
//! distribution of its subset, ready for icicle, node-link, or matrix
//! renderers. The crate also ranks candidate next features by entropy or
//! prediction-error criteria, optionally on a background worker.
//!
//! ```
//! use featuretree::{build_tree, BinningStrategy, Dataset, ExplorerConfig, Metadata, Value};
//!
//! let rows = (0..10)
//!     .map(|i| vec![Value::from(f64::from(i)), Value::from(if i < 5 { "A" } else { "B" })])
//!     .collect::<Vec<_>>();
//! let dataset = Dataset::from_rows(["x", "label"], rows).unwrap();
//! let metadata = Metadata::from_dataset(&dataset, &ExplorerConfig::default()).unwrap();
//!
//! let tree = build_tree(&dataset, &metadata, &["x"], BinningStrategy::EqualInterval).unwrap();
//! assert_eq!(tree.children().len(), 3);
//! assert_eq!(tree.size(), 10);
//! ```

pub mod config;
pub mod data;
pub mod parallelism;
pub mod suggest;
pub mod testing;
pub mod tree;
pub mod vis;

pub use config::{ConfigError, ExplorerConfig};
pub use data::{
    BinEdges, BinningStrategy, Dataset, DatasetError, FeatureDescriptor, FeatureKind, Metadata,
    MetadataError, Record, Value,
};
pub use parallelism::Parallelism;
pub use suggest::{
    suggest_next_feature, FeatureSuggester, SuggestionCriterion, SuggestionRequest,
    SuggestionResponse, SuggestionWorker,
};
pub use tree::{build_tree, flatten_leaves, get_data, LeafAggregate, PartitionNode};
pub use vis::{VisualizationInput, VisualizationKind};
