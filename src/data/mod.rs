//! Dataset, cell values, binning, and feature descriptors.
//!
//! # Key Types
//!
//! - [`Dataset`] / [`Record`] - ordered labeled rows, label in the last column
//! - [`Value`] - one cell: number, date, text, or missing
//! - [`BinEdges`] / [`BinningStrategy`] - quantitative thresholds
//! - [`FeatureDescriptor`] / [`Metadata`] - per-feature descriptors bundled
//!   with label information

mod binning;
mod dataset;
mod descriptor;
mod value;

pub use binning::{
    equal_interval_thresholds, extent, quantile_sorted, quantile_thresholds, BinEdges,
    BinningStrategy, UnknownStrategy,
};
pub use dataset::{Dataset, DatasetError, Record};
pub use descriptor::{
    CategoricalFeature, FeatureDescriptor, FeatureKind, Metadata, MetadataError, Partition,
    QuantitativeFeature,
};
pub use value::{Value, MISSING_KEY};
