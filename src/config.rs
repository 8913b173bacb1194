//! Explorer configuration with builder pattern.
//!
//! [`ExplorerConfig`] bundles the settings the interactive layer toggles:
//! the ordinal bin labels (which also fix the bin count), the active binning
//! strategy, the suggestion criterion, scoring parallelism, and the optional
//! column holding a collaborator's predictions.
//!
//! # Example
//!
//! ```
//! use featuretree::{BinningStrategy, ExplorerConfig, SuggestionCriterion};
//!
//! // Reference configuration: three bins labelled low / medium / high.
//! let config = ExplorerConfig::builder().build().unwrap();
//! assert_eq!(config.n_bins(), 3);
//!
//! let config = ExplorerConfig::builder()
//!     .ordinal_labels(vec!["lowest".into(), "low".into(), "high".into(), "highest".into()])
//!     .strategy(BinningStrategy::Quantile)
//!     .criterion(SuggestionCriterion::Entropy)
//!     .prediction_column("predicted")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.n_bins(), 4);
//! ```

use bon::Builder;

use crate::data::BinningStrategy;
use crate::parallelism::Parallelism;
use crate::suggest::SuggestionCriterion;

/// Ordinal labels of the reference configuration.
pub const DEFAULT_ORDINAL_LABELS: [&str; 3] = ["low", "medium", "high"];

/// The reference ordinal labels as owned strings.
pub fn default_ordinal_labels() -> Vec<String> {
    DEFAULT_ORDINAL_LABELS.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// At least one ordinal label (one bin) is required.
    #[error("ordinal_labels must not be empty")]
    NoOrdinalLabels,

    /// Bin labels double as child labels and must be distinct.
    #[error("duplicate ordinal label: {0:?}")]
    DuplicateOrdinalLabel(String),

    /// The prediction column name must be non-empty.
    #[error("prediction_column must not be empty")]
    EmptyPredictionColumn,
}

// =============================================================================
// ExplorerConfig
// =============================================================================

/// Configuration for descriptor building, tree building and suggestions.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ExplorerConfig {
    /// Labels of the quantitative bins, lowest first. Their count is the
    /// number of bins. Default: `low, medium, high`.
    #[builder(default = default_ordinal_labels())]
    pub ordinal_labels: Vec<String>,

    /// Binning strategy applied to every quantitative feature.
    /// Default: equal-interval.
    #[builder(default)]
    pub strategy: BinningStrategy,

    /// Criterion used to suggest the next feature. Default: `None`.
    #[builder(default)]
    pub criterion: SuggestionCriterion,

    /// Parallelism hint for candidate scoring. Default: sequential.
    #[builder(default)]
    pub parallelism: Parallelism,

    /// Column holding the collaborator's predicted label for each row.
    /// `None` disables prediction tallies.
    #[builder(into)]
    pub prediction_column: Option<String>,
}

/// Custom finishing function that validates the config.
impl<S: explorer_config_builder::IsComplete> ExplorerConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the ordinal labels are empty or repeat, or
    /// the prediction column name is empty.
    pub fn build(self) -> Result<ExplorerConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ExplorerConfig {
    /// Number of bins for quantitative features.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.ordinal_labels.len()
    }

    /// Check the invariants `build()` enforces. Configs written as struct
    /// literals skip the builder, so consumers call this again.
    ///
    /// # Errors
    ///
    /// Same as [`ExplorerConfigBuilder::build`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ordinal_labels.is_empty() {
            return Err(ConfigError::NoOrdinalLabels);
        }
        for (i, label) in self.ordinal_labels.iter().enumerate() {
            if self.ordinal_labels[..i].contains(label) {
                return Err(ConfigError::DuplicateOrdinalLabel(label.clone()));
            }
        }
        if matches!(self.prediction_column.as_deref(), Some("")) {
            return Err(ConfigError::EmptyPredictionColumn);
        }
        Ok(())
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            ordinal_labels: default_ordinal_labels(),
            strategy: BinningStrategy::default(),
            criterion: SuggestionCriterion::default(),
            parallelism: Parallelism::default(),
            prediction_column: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExplorerConfig::builder().build().unwrap();
        assert_eq!(config.ordinal_labels, vec!["low", "medium", "high"]);
        assert_eq!(config.n_bins(), 3);
        assert_eq!(config.strategy, BinningStrategy::EqualInterval);
        assert_eq!(config.criterion, SuggestionCriterion::None);
        assert_eq!(config.parallelism, Parallelism::Sequential);
        assert_eq!(config.prediction_column, None);
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn test_empty_labels_rejected() {
        let result = ExplorerConfig::builder().ordinal_labels(vec![]).build();
        assert_eq!(result, Err(ConfigError::NoOrdinalLabels));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result = ExplorerConfig::builder()
            .ordinal_labels(vec!["low".into(), "high".into(), "low".into()])
            .build();
        assert_eq!(result, Err(ConfigError::DuplicateOrdinalLabel("low".into())));
    }

    #[test]
    fn test_single_bin_is_valid() {
        let config = ExplorerConfig::builder()
            .ordinal_labels(vec!["all".into()])
            .build()
            .unwrap();
        assert_eq!(config.n_bins(), 1);
    }

    #[test]
    fn test_empty_prediction_column_rejected() {
        let result = ExplorerConfig::builder().prediction_column("").build();
        assert_eq!(result, Err(ConfigError::EmptyPredictionColumn));
    }
}
