//! Next-feature suggestion.
//!
//! For every feature not yet selected, the engine appends it to the
//! selection, computes the resulting leaves, scores them under the active
//! criterion, and returns the best candidate. The prefix partition is shared
//! by all candidates, so each candidate costs one extra split per prefix leaf
//! rather than a full tree build.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ExplorerConfig;
use crate::data::{BinningStrategy, Dataset, FeatureDescriptor, Metadata, MetadataError};
use crate::parallelism::Parallelism;
use crate::tree::{LeafAggregate, Tally, TreeBuilder};

use super::score::score;
use super::SuggestionCriterion;

/// Score of one candidate feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub feature: String,
    pub score: f64,
}

/// Scores candidate next features over one dataset.
#[derive(Debug, Clone)]
pub struct FeatureSuggester<'a> {
    metadata: &'a Metadata,
    dataset: &'a Dataset,
    strategy: BinningStrategy,
    parallelism: Parallelism,
    criterion: SuggestionCriterion,
}

impl<'a> FeatureSuggester<'a> {
    /// Create a sequential suggester.
    pub fn new(metadata: &'a Metadata, dataset: &'a Dataset, strategy: BinningStrategy) -> Self {
        Self {
            metadata,
            dataset,
            strategy,
            parallelism: Parallelism::Sequential,
            criterion: SuggestionCriterion::None,
        }
    }

    /// Create a suggester with the configured strategy, parallelism, and
    /// criterion.
    pub fn from_config(
        metadata: &'a Metadata,
        dataset: &'a Dataset,
        config: &ExplorerConfig,
    ) -> Self {
        let mut suggester =
            Self::new(metadata, dataset, config.strategy).with_parallelism(config.parallelism);
        suggester.criterion = config.criterion;
        suggester
    }

    /// Score candidates in parallel when the hint and workload allow it.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Features that may follow `selection`, in metadata order.
    pub fn available<S: AsRef<str>>(&self, selection: &[S]) -> Vec<&'a str> {
        self.metadata
            .feature_names()
            .into_iter()
            .filter(|name| !selection.iter().any(|s| s.as_ref() == *name))
            .collect()
    }

    /// Score every available candidate, in candidate order.
    ///
    /// Returns an empty list when the criterion is disabled.
    ///
    /// # Errors
    ///
    /// Fails on an invalid selection or a dataset whose columns differ from
    /// the described ones.
    pub fn rank<S: AsRef<str>>(
        &self,
        criterion: SuggestionCriterion,
        selection: &[S],
    ) -> Result<Vec<CandidateScore>, MetadataError> {
        if !criterion.is_enabled() {
            return Ok(Vec::new());
        }

        let prefix = TreeBuilder::new(self.metadata, selection, self.strategy)?;
        let groups = prefix.leaf_rows(self.dataset)?;
        let candidates: Vec<&FeatureDescriptor> = self
            .available(selection)
            .into_iter()
            .filter_map(|name| self.metadata.feature(name))
            .collect();

        let total_size = self.dataset.n_rows();
        let score_one = |feature: &&FeatureDescriptor| -> Result<CandidateScore, MetadataError> {
            let leaves = self.candidate_leaves(feature, &groups)?;
            let value = score(criterion, &leaves, total_size).unwrap_or(0.0);
            tracing::debug!(
                feature = feature.name(),
                criterion = %criterion,
                score = value,
                leaves = leaves.len(),
                "scored candidate"
            );
            Ok(CandidateScore {
                feature: feature.name().to_string(),
                score: value,
            })
        };

        if self.parallelism.fans_out(candidates.len()) {
            candidates.par_iter().map(score_one).collect()
        } else {
            candidates.iter().map(score_one).collect()
        }
    }

    /// Best candidate under the configured criterion.
    ///
    /// Suggests nothing unless built with [`FeatureSuggester::from_config`].
    pub fn suggest_configured<S: AsRef<str>>(
        &self,
        selection: &[S],
    ) -> Result<String, MetadataError> {
        self.suggest(self.criterion, selection)
    }

    /// Best candidate under `criterion`, or an empty string when the
    /// criterion is disabled, every feature is already selected, or no
    /// candidate beats [`Optimum::baseline`](super::Optimum::baseline).
    ///
    /// Error criteria therefore suggest nothing when no leaf has an error
    /// (or no spread). Ties keep the first candidate in metadata order.
    pub fn suggest<S: AsRef<str>>(
        &self,
        criterion: SuggestionCriterion,
        selection: &[S],
    ) -> Result<String, MetadataError> {
        let Some(optimum) = criterion.optimum() else {
            return Ok(String::new());
        };

        let started = Instant::now();
        let ranked = self.rank(criterion, selection)?;

        let mut best: Option<&CandidateScore> = None;
        let mut best_score = optimum.baseline();
        for candidate in &ranked {
            if optimum.improves(candidate.score, best_score) {
                best = Some(candidate);
                best_score = candidate.score;
            }
        }

        let suggestion = best.map(|b| b.feature.clone()).unwrap_or_default();
        tracing::info!(
            criterion = %criterion,
            selected = selection.len(),
            candidates = ranked.len(),
            suggestion = %suggestion,
            elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
            "suggested next feature"
        );
        Ok(suggestion)
    }

    /// Leaves of `selection + [feature]`, built from the prefix leaf rows.
    fn candidate_leaves(
        &self,
        feature: &FeatureDescriptor,
        groups: &[Vec<usize>],
    ) -> Result<Vec<LeafAggregate>, MetadataError> {
        let mut leaves = Vec::new();
        for rows in groups {
            for part in feature.split(self.dataset, rows, self.strategy)? {
                leaves.push(LeafAggregate(Tally::of_rows(
                    self.metadata,
                    self.dataset,
                    &part.rows,
                )));
            }
        }
        Ok(leaves)
    }
}

/// Suggest the next feature for a selection.
///
/// Returns an empty string when `criterion` is `None` or no feature is left.
///
/// # Errors
///
/// Fails on an invalid selection or a dataset whose columns differ from the
/// described ones.
pub fn suggest_next_feature<S: AsRef<str>>(
    criterion: SuggestionCriterion,
    selection: &[S],
    metadata: &Metadata,
    dataset: &Dataset,
    strategy: BinningStrategy,
) -> Result<String, MetadataError> {
    FeatureSuggester::new(metadata, dataset, strategy).suggest(criterion, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::tree::flatten_leaves;

    /// 100 rows labelled 60 A / 40 B; `perfect` separates them, `noise` does not.
    fn sixty_forty() -> (Dataset, Metadata) {
        let rows = (0..100)
            .map(|i| {
                let label = if i < 60 { "A" } else { "B" };
                let perfect = if i < 60 { "a" } else { "b" };
                let noise = if i % 2 == 0 { "even" } else { "odd" };
                vec![Value::from(noise), Value::from(perfect), Value::from(label)]
            })
            .collect::<Vec<_>>();
        let ds = Dataset::from_rows(["noise", "perfect", "label"], rows).unwrap();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        (ds, meta)
    }

    #[test]
    fn entropy_prefers_pure_split() {
        let (ds, meta) = sixty_forty();
        let suggester = FeatureSuggester::new(&meta, &ds, BinningStrategy::EqualInterval);
        let ranked = suggester.rank::<&str>(SuggestionCriterion::Entropy, &[]).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].feature, "perfect");
        assert_eq!(ranked[1].score, 0.0);
        assert!(ranked[0].score > 0.9);

        assert_eq!(
            suggester.suggest::<&str>(SuggestionCriterion::Entropy, &[]).unwrap(),
            "perfect"
        );
    }

    #[test]
    fn disabled_or_exhausted_returns_empty() {
        let (ds, meta) = sixty_forty();
        let strategy = BinningStrategy::EqualInterval;
        assert_eq!(
            suggest_next_feature::<&str>(SuggestionCriterion::None, &[], &meta, &ds, strategy)
                .unwrap(),
            ""
        );
        assert_eq!(
            suggest_next_feature(
                SuggestionCriterion::Entropy,
                &["noise", "perfect"],
                &meta,
                &ds,
                strategy
            )
            .unwrap(),
            ""
        );
    }

    #[test]
    fn error_criteria_without_errors_suggest_nothing() {
        let (ds, meta) = sixty_forty();
        // No predictions: every error score is 0.
        for criterion in [
            SuggestionCriterion::ErrorCount,
            SuggestionCriterion::ErrorPercent,
            SuggestionCriterion::ErrorDeviation,
        ] {
            let suggestion = suggest_next_feature::<&str>(
                criterion,
                &[],
                &meta,
                &ds,
                BinningStrategy::EqualInterval,
            )
            .unwrap();
            assert_eq!(suggestion, "", "{criterion}");
        }
    }

    #[test]
    fn entropy_ties_keep_first_candidate() {
        let rows = (0..8)
            .map(|i| {
                let a = if i % 2 == 0 { "a0" } else { "a1" };
                let b = if i % 2 == 0 { "b0" } else { "b1" };
                vec![Value::from(a), Value::from(b), Value::from(if i < 4 { "A" } else { "B" })]
            })
            .collect::<Vec<_>>();
        let ds = Dataset::from_rows(["a", "b", "label"], rows).unwrap();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let suggestion = suggest_next_feature::<&str>(
            SuggestionCriterion::Entropy,
            &[],
            &meta,
            &ds,
            BinningStrategy::EqualInterval,
        )
        .unwrap();
        assert_eq!(suggestion, "a");
    }

    #[test]
    fn prefix_reuse_matches_flatten_leaves() {
        let (ds, meta) = sixty_forty();
        let suggester = FeatureSuggester::new(&meta, &ds, BinningStrategy::Quantile);
        let prefix = TreeBuilder::new(&meta, &["noise"], BinningStrategy::Quantile).unwrap();
        let groups = prefix.leaf_rows(&ds).unwrap();

        let reused = suggester
            .candidate_leaves(meta.feature("perfect").unwrap(), &groups)
            .unwrap();
        let rebuilt =
            flatten_leaves(&meta, &["noise", "perfect"], &ds, BinningStrategy::Quantile).unwrap();
        assert_eq!(reused, rebuilt);
    }

    #[test]
    fn parallel_scoring_matches_sequential() {
        let (ds, meta) = sixty_forty();
        let sequential = FeatureSuggester::new(&meta, &ds, BinningStrategy::EqualInterval);
        let parallel = sequential.clone().with_parallelism(Parallelism::Parallel(4));
        assert_eq!(
            sequential.rank::<&str>(SuggestionCriterion::Entropy, &[]).unwrap(),
            parallel.rank::<&str>(SuggestionCriterion::Entropy, &[]).unwrap()
        );
    }

    #[test]
    fn configured_suggester() {
        let (ds, meta) = sixty_forty();
        let config = ExplorerConfig::builder()
            .criterion(SuggestionCriterion::Entropy)
            .strategy(BinningStrategy::Quantile)
            .parallelism(Parallelism::Parallel(2))
            .build()
            .unwrap();
        let suggester = FeatureSuggester::from_config(&meta, &ds, &config);
        assert_eq!(suggester.strategy, BinningStrategy::Quantile);
        assert_eq!(suggester.suggest_configured::<&str>(&[]).unwrap(), "perfect");

        let unconfigured = FeatureSuggester::new(&meta, &ds, BinningStrategy::Quantile);
        assert_eq!(unconfigured.suggest_configured::<&str>(&[]).unwrap(), "");
    }

    #[test]
    fn invalid_selection_is_an_error() {
        let (ds, meta) = sixty_forty();
        let err = suggest_next_feature(
            SuggestionCriterion::Entropy,
            &["missing"],
            &meta,
            &ds,
            BinningStrategy::EqualInterval,
        )
        .unwrap_err();
        assert_eq!(err, MetadataError::UnknownFeature("missing".into()));
    }
}
