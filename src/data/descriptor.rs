//! Feature descriptors and the metadata bundle.
//!
//! [`Metadata::from_dataset`] inspects every column once and produces a typed
//! [`FeatureDescriptor`] per feature:
//! - quantitative columns get their extent and both threshold sets
//! - categorical columns get their distinct values over the whole dataset
//! - temporal columns are described but never split
//!
//! Descriptors own the split operation. A split returns [`Partition`]s that
//! carry their own label, so children can never be mislabelled by position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::binning::{extent, BinEdges, BinningStrategy};
use super::{Dataset, DatasetError, Value, MISSING_KEY};
use crate::config::{ConfigError, ExplorerConfig};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while describing a dataset or resolving a selection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("feature {0} is temporal and cannot be split")]
    NotSplittable(String),

    #[error("feature {0} appears more than once in the selection")]
    DuplicateSelection(String),

    #[error("prediction column {0} cannot also be the label column")]
    PredictionIsLabel(String),

    #[error("dataset columns {got:?} do not match the described columns {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("described column index {column} is out of range for {width} columns")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("feature {feature} maps a value to bin {bin} but has only {n_bins} bin labels")]
    BinOutOfRange {
        feature: String,
        bin: usize,
        n_bins: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ============================================================================
// Descriptors
// ============================================================================

/// Descriptor details for a quantitative feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeFeature {
    /// Minimum and maximum over the full column.
    pub extent: (f64, f64),
    /// Equal-interval edges over `extent`.
    pub equal_interval: BinEdges,
    /// Quantile edges over the full column.
    pub quantile: BinEdges,
    /// Label of each bin, lowest first.
    pub ordinal_labels: Vec<String>,
}

impl QuantitativeFeature {
    fn from_column(values: &[f64], ordinal_labels: &[String]) -> Self {
        let n_bins = ordinal_labels.len();
        let ext = extent(values).unwrap_or((0.0, 0.0));
        Self {
            extent: ext,
            equal_interval: BinEdges::equal_interval(ext, n_bins),
            quantile: BinEdges::quantile(values, n_bins),
            ordinal_labels: ordinal_labels.to_vec(),
        }
    }

    /// Edges used under a strategy.
    #[inline]
    pub fn edges(&self, strategy: BinningStrategy) -> &BinEdges {
        match strategy {
            BinningStrategy::EqualInterval => &self.equal_interval,
            BinningStrategy::Quantile => &self.quantile,
        }
    }

    /// Number of bins every split of this feature produces.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.ordinal_labels.len()
    }
}

/// Descriptor details for a categorical feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalFeature {
    /// Category keys over the full column in first-occurrence order.
    pub distinct_values: Vec<String>,
}

/// Feature kind with its kind-specific details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureKind {
    #[serde(rename = "Q")]
    Quantitative(QuantitativeFeature),
    #[serde(rename = "C")]
    Categorical(CategoricalFeature),
    #[serde(rename = "T")]
    Temporal,
}

/// Precomputed metadata about one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    name: String,
    column: usize,
    kind: FeatureKind,
}

/// One child subset produced by a split, tagged with its own label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Bin label or category key of this subset.
    pub label: String,
    /// Row indices, in dataset order.
    pub rows: Vec<usize>,
}

impl FeatureDescriptor {
    /// Describe one column.
    ///
    /// A column is quantitative when it is non-empty and every value is a
    /// finite number, temporal when its first value is a date, and
    /// categorical otherwise.
    pub fn from_column(
        dataset: &Dataset,
        column: usize,
        ordinal_labels: &[String],
    ) -> Result<Self, MetadataError> {
        let name = dataset
            .columns()
            .get(column)
            .cloned()
            .ok_or_else(|| DatasetError::UnknownColumn(format!("#{column}")))?;

        let numeric: Option<Vec<f64>> = dataset.column(column).map(Value::as_f64).collect();
        let first_is_date = dataset.column(column).next().is_some_and(Value::is_date);

        let kind = match numeric {
            Some(values) if !values.is_empty() => {
                FeatureKind::Quantitative(QuantitativeFeature::from_column(&values, ordinal_labels))
            }
            _ if first_is_date => FeatureKind::Temporal,
            _ => {
                let mut distinct_values: Vec<String> = Vec::new();
                let mut seen = std::collections::HashSet::new();
                for value in dataset.column(column) {
                    let key = value.category_key();
                    if seen.insert(key.clone()) {
                        distinct_values.push(key);
                    }
                }
                FeatureKind::Categorical(CategoricalFeature { distinct_values })
            }
        };

        Ok(Self { name, column, kind })
    }

    /// Feature name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column index in the described dataset.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Kind and kind-specific details.
    #[inline]
    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    /// Returns true if the feature may appear in a selection.
    #[inline]
    pub fn is_splittable(&self) -> bool {
        !matches!(self.kind, FeatureKind::Temporal)
    }

    /// Split a subset of rows.
    ///
    /// Quantitative features always yield one partition per bin, in bin
    /// order, empty bins included. Categorical features yield one partition
    /// per category present in the subset, in encounter order; an empty
    /// subset yields one empty partition per known category so that the
    /// tree below it keeps its full depth.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::NotSplittable`] for temporal features.
    pub fn split(
        &self,
        dataset: &Dataset,
        rows: &[usize],
        strategy: BinningStrategy,
    ) -> Result<Vec<Partition>, MetadataError> {
        match &self.kind {
            FeatureKind::Quantitative(q) => self.split_quantitative(q, dataset, rows, strategy),
            FeatureKind::Categorical(c) => Ok(self.split_categorical(c, dataset, rows)),
            FeatureKind::Temporal => Err(MetadataError::NotSplittable(self.name.clone())),
        }
    }

    fn split_quantitative(
        &self,
        q: &QuantitativeFeature,
        dataset: &Dataset,
        rows: &[usize],
        strategy: BinningStrategy,
    ) -> Result<Vec<Partition>, MetadataError> {
        let edges = q.edges(strategy);
        let mut parts: Vec<Partition> = q
            .ordinal_labels
            .iter()
            .map(|label| Partition {
                label: label.clone(),
                rows: Vec::new(),
            })
            .collect();

        for &row in rows {
            // Quantitative columns hold only finite numbers.
            let value = dataset.value(row, self.column).as_f64().unwrap_or(q.extent.0);
            let bin = edges.value_to_bin(value);
            let n_bins = parts.len();
            parts
                .get_mut(bin)
                .ok_or_else(|| MetadataError::BinOutOfRange {
                    feature: self.name.clone(),
                    bin,
                    n_bins,
                })?
                .rows
                .push(row);
        }

        Ok(parts)
    }

    fn split_categorical(
        &self,
        c: &CategoricalFeature,
        dataset: &Dataset,
        rows: &[usize],
    ) -> Vec<Partition> {
        if rows.is_empty() {
            if c.distinct_values.is_empty() {
                // Described from an empty column: keep one placeholder child.
                return vec![Partition {
                    label: MISSING_KEY.to_string(),
                    rows: Vec::new(),
                }];
            }
            return c
                .distinct_values
                .iter()
                .map(|label| Partition {
                    label: label.clone(),
                    rows: Vec::new(),
                })
                .collect();
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut parts: Vec<Partition> = Vec::new();
        for &row in rows {
            let key = dataset.value(row, self.column).category_key();
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = parts.len();
                    index.insert(key.clone(), slot);
                    parts.push(Partition {
                        label: key,
                        rows: Vec::new(),
                    });
                    slot
                }
            };
            parts[slot].rows.push(row);
        }

        parts
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Descriptors plus label information for one dataset.
///
/// This is the `metadata` object handed to tree building, suggestion
/// requests, and renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    columns: Vec<String>,
    features: Vec<FeatureDescriptor>,
    label: String,
    label_column: usize,
    label_values: Vec<String>,
    prediction: Option<String>,
    prediction_column: Option<usize>,
    size: usize,
}

impl Metadata {
    /// Describe a dataset.
    ///
    /// The label is the last column. Every other column except the
    /// configured prediction column becomes a feature.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid, or if the configured prediction column
    /// does not exist or is the label column.
    pub fn from_dataset(dataset: &Dataset, config: &ExplorerConfig) -> Result<Self, MetadataError> {
        config.validate()?;
        let label = dataset.label_column().to_string();
        let label_column = dataset.column_index(&label)?;

        let prediction_column = match config.prediction_column.as_deref() {
            Some(name) if name == label => {
                return Err(MetadataError::PredictionIsLabel(name.to_string()))
            }
            Some(name) => Some(dataset.column_index(name)?),
            None => None,
        };

        let features = (0..dataset.columns().len())
            .filter(|&col| col != label_column && Some(col) != prediction_column)
            .map(|col| FeatureDescriptor::from_column(dataset, col, &config.ordinal_labels))
            .collect::<Result<Vec<_>, _>>()?;

        let mut label_values: Vec<String> = Vec::new();
        for value in dataset.column(label_column) {
            let key = value.category_key();
            if !label_values.contains(&key) {
                label_values.push(key);
            }
        }

        tracing::debug!(
            dataset = dataset.name(),
            rows = dataset.n_rows(),
            features = features.len(),
            label = %label,
            "described dataset"
        );

        Ok(Self {
            columns: dataset.columns().to_vec(),
            features,
            label,
            label_column,
            label_values,
            prediction: config.prediction_column.clone(),
            prediction_column,
            size: dataset.n_rows(),
        })
    }

    /// All feature descriptors in column order.
    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    /// Look up a descriptor by name.
    pub fn feature(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Names of the features that can be selected, in column order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.is_splittable())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Label column name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label column index.
    #[inline]
    pub fn label_column(&self) -> usize {
        self.label_column
    }

    /// Label values in first-occurrence order.
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Prediction column name, if predictions were supplied.
    pub fn prediction(&self) -> Option<&str> {
        self.prediction.as_deref()
    }

    /// Prediction column index, if predictions were supplied.
    #[inline]
    pub fn prediction_column(&self) -> Option<usize> {
        self.prediction_column
    }

    /// Number of rows in the described dataset.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check that a dataset has the column layout these descriptors index.
    ///
    /// Filtered views of the described dataset pass; unrelated datasets
    /// do not. Every column index held here must also fit the dataset.
    pub fn check_dataset(&self, dataset: &Dataset) -> Result<(), MetadataError> {
        if dataset.columns() != self.columns.as_slice() {
            return Err(MetadataError::SchemaMismatch {
                expected: self.columns.clone(),
                got: dataset.columns().to_vec(),
            });
        }
        let width = dataset.columns().len();
        let out_of_range = self
            .features
            .iter()
            .map(|f| f.column)
            .chain(std::iter::once(self.label_column))
            .chain(self.prediction_column)
            .find(|&column| column >= width);
        match out_of_range {
            Some(column) => Err(MetadataError::ColumnOutOfRange { column, width }),
            None => Ok(()),
        }
    }

    /// Resolve a selection to descriptors.
    ///
    /// # Errors
    ///
    /// Fails on unknown, temporal, or repeated feature names.
    pub fn resolve<S: AsRef<str>>(
        &self,
        selection: &[S],
    ) -> Result<Vec<&FeatureDescriptor>, MetadataError> {
        let mut resolved: Vec<&FeatureDescriptor> = Vec::with_capacity(selection.len());
        for name in selection {
            let name = name.as_ref();
            let feature = self
                .feature(name)
                .ok_or_else(|| MetadataError::UnknownFeature(name.to_string()))?;
            if !feature.is_splittable() {
                return Err(MetadataError::NotSplittable(name.to_string()));
            }
            if resolved.iter().any(|f| f.name == name) {
                return Err(MetadataError::DuplicateSelection(name.to_string()));
            }
            resolved.push(feature);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn toy() -> Dataset {
        let date = |d| {
            Value::from(
                NaiveDate::from_ymd_opt(2021, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        Dataset::from_rows(
            ["age", "color", "joined", "label"],
            vec![
                vec![Value::from(0.0), Value::from("y"), date(1), Value::from("A")],
                vec![Value::from(9.0), Value::from("x"), date(2), Value::from("B")],
                vec![Value::from(3.0), Value::from("z"), date(3), Value::from("A")],
                vec![Value::from(6.0), Value::from("y"), date(4), Value::from("B")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn kinds_are_inferred() {
        let meta = Metadata::from_dataset(&toy(), &ExplorerConfig::default()).unwrap();
        assert_eq!(meta.label(), "label");
        assert_eq!(meta.label_values(), &["A", "B"]);
        assert_eq!(meta.size(), 4);

        let age = meta.feature("age").unwrap();
        match age.kind() {
            FeatureKind::Quantitative(q) => {
                assert_eq!(q.extent, (0.0, 9.0));
                assert_eq!(q.equal_interval.thresholds(), &[3.0, 6.0]);
                assert_eq!(q.ordinal_labels, vec!["low", "medium", "high"]);
            }
            other => panic!("expected quantitative, got {other:?}"),
        }

        match meta.feature("color").unwrap().kind() {
            FeatureKind::Categorical(c) => assert_eq!(c.distinct_values, vec!["y", "x", "z"]),
            other => panic!("expected categorical, got {other:?}"),
        }

        assert_eq!(meta.feature("joined").unwrap().kind(), &FeatureKind::Temporal);
        assert_eq!(meta.feature_names(), vec!["age", "color"]);
    }

    #[test]
    fn mixed_column_is_categorical() {
        let ds = Dataset::from_rows(
            ["f", "label"],
            vec![
                vec![Value::from(1.0), Value::from("A")],
                vec![Value::Missing, Value::from("B")],
            ],
        )
        .unwrap();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        match meta.feature("f").unwrap().kind() {
            FeatureKind::Categorical(c) => assert_eq!(c.distinct_values, vec!["1", "null"]),
            other => panic!("expected categorical, got {other:?}"),
        }
    }

    #[test]
    fn categorical_split_labels_children_by_own_key() {
        let ds = toy();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let color = meta.feature("color").unwrap();

        // Rows 1 (x) and 3 (y), presented y first: no "z" child, no shift.
        let parts = color
            .split(&ds, &[3, 1], BinningStrategy::EqualInterval)
            .unwrap();
        assert_eq!(
            parts,
            vec![
                Partition { label: "y".into(), rows: vec![3] },
                Partition { label: "x".into(), rows: vec![1] },
            ]
        );
    }

    #[test]
    fn empty_categorical_split_expands_known_categories() {
        let ds = toy();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let parts = meta
            .feature("color")
            .unwrap()
            .split(&ds, &[], BinningStrategy::EqualInterval)
            .unwrap();
        let labels: Vec<&str> = parts.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["y", "x", "z"]);
        assert!(parts.iter().all(|p| p.rows.is_empty()));
    }

    #[test]
    fn quantitative_split_keeps_empty_bins() {
        let ds = toy();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let age = meta.feature("age").unwrap();

        // Only the row with age 0 -> everything in "low".
        let parts = age.split(&ds, &[0], BinningStrategy::EqualInterval).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].rows, vec![0]);
        assert!(parts[1].rows.is_empty());
        assert!(parts[2].rows.is_empty());
        assert_eq!(parts[2].label, "high");
    }

    #[test]
    fn temporal_split_is_rejected() {
        let ds = toy();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let err = meta
            .feature("joined")
            .unwrap()
            .split(&ds, &[0], BinningStrategy::EqualInterval)
            .unwrap_err();
        assert_eq!(err, MetadataError::NotSplittable("joined".into()));
    }

    #[test]
    fn resolve_validates_selection() {
        let meta = Metadata::from_dataset(&toy(), &ExplorerConfig::default()).unwrap();
        assert_eq!(meta.resolve(&["color", "age"]).unwrap().len(), 2);
        assert_eq!(
            meta.resolve(&["nope"]).unwrap_err(),
            MetadataError::UnknownFeature("nope".into())
        );
        assert_eq!(
            meta.resolve(&["joined"]).unwrap_err(),
            MetadataError::NotSplittable("joined".into())
        );
        assert_eq!(
            meta.resolve(&["age", "age"]).unwrap_err(),
            MetadataError::DuplicateSelection("age".into())
        );
        assert_eq!(
            meta.resolve(&["label"]).unwrap_err(),
            MetadataError::UnknownFeature("label".into())
        );
    }

    #[test]
    fn prediction_column_is_not_a_feature() {
        let ds = Dataset::from_rows(
            ["f", "predicted", "label"],
            vec![vec![Value::from(1.0), Value::from("A"), Value::from("A")]],
        )
        .unwrap();
        let config = ExplorerConfig::builder()
            .prediction_column("predicted")
            .build()
            .unwrap();
        let meta = Metadata::from_dataset(&ds, &config).unwrap();
        assert_eq!(meta.feature_names(), vec!["f"]);
        assert_eq!(meta.prediction_column(), Some(1));

        let bad = ExplorerConfig::builder()
            .prediction_column("label")
            .build()
            .unwrap();
        assert_eq!(
            Metadata::from_dataset(&ds, &bad).unwrap_err(),
            MetadataError::PredictionIsLabel("label".into())
        );
    }

    #[test]
    fn from_dataset_validates_literal_config() {
        let config = ExplorerConfig {
            ordinal_labels: vec![],
            ..Default::default()
        };
        assert_eq!(
            Metadata::from_dataset(&toy(), &config).unwrap_err(),
            MetadataError::Config(ConfigError::NoOrdinalLabels)
        );
    }

    #[test]
    fn short_bin_labels_fail_the_split() {
        let ds = toy();
        let mut meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        // Edges still describe three bins.
        if let FeatureKind::Quantitative(q) = &mut meta.features[0].kind {
            q.ordinal_labels.truncate(1);
        }
        let age = meta.feature("age").unwrap();

        // Age 0 lands in bin 0, which still exists.
        assert_eq!(age.split(&ds, &[0], BinningStrategy::EqualInterval).unwrap().len(), 1);
        assert_eq!(
            age.split(&ds, &[0, 1], BinningStrategy::EqualInterval).unwrap_err(),
            MetadataError::BinOutOfRange {
                feature: "age".into(),
                bin: 2,
                n_bins: 1,
            }
        );
    }

    #[test]
    fn schema_check_rejects_out_of_range_columns() {
        let ds = toy();
        let mut meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        meta.label_column = 7;
        assert_eq!(
            meta.check_dataset(&ds).unwrap_err(),
            MetadataError::ColumnOutOfRange { column: 7, width: 4 }
        );
    }

    #[test]
    fn schema_check() {
        let ds = toy();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        assert!(meta.check_dataset(&ds).is_ok());

        let other = Dataset::from_rows(["a", "label"], Vec::<Vec<Value>>::new()).unwrap();
        assert!(matches!(
            meta.check_dataset(&other),
            Err(MetadataError::SchemaMismatch { .. })
        ));
    }
}
