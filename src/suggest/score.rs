//! Leaf-level scoring functions.
//!
//! All functions accept leaves of size zero: they contribute zero entropy and
//! are skipped by the error extremum and deviation aggregates. Aggregates over
//! no qualifying leaves are 0.

use crate::tree::{Counts, LeafAggregate};

use super::SuggestionCriterion;

/// Shannon entropy (base 2) of a label distribution.
///
/// Classes with zero count contribute nothing; an empty distribution has
/// entropy 0.
pub fn entropy(counts: &Counts, size: usize) -> f64 {
    if size == 0 {
        return 0.0;
    }
    let n = size as f64;
    let h: f64 = counts
        .values()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum();
    // Pure leaves give -0.0.
    (-h).max(0.0)
}

/// Size-weighted mean leaf entropy, weights relative to `total_size`.
pub fn weighted_entropy(leaves: &[LeafAggregate], total_size: usize) -> f64 {
    if total_size == 0 {
        return 0.0;
    }
    let total = total_size as f64;
    leaves
        .iter()
        .map(|leaf| {
            let weight = leaf.size() as f64 / total;
            weight * entropy(&leaf.tally().label_counts, leaf.size())
        })
        .sum()
}

/// Incorrect-prediction rate of a leaf, `None` for empty leaves.
#[inline]
pub fn error_rate(leaf: &LeafAggregate) -> Option<f64> {
    (leaf.size() > 0).then(|| leaf.incorrect() as f64 / leaf.size() as f64)
}

/// Largest incorrect count over non-empty leaves.
pub fn max_error_count(leaves: &[LeafAggregate]) -> f64 {
    leaves
        .iter()
        .filter(|l| l.size() > 0)
        .map(|l| l.incorrect() as f64)
        .fold(0.0, f64::max)
}

/// Largest incorrect rate over non-empty leaves.
pub fn max_error_rate(leaves: &[LeafAggregate]) -> f64 {
    leaves.iter().filter_map(error_rate).fold(0.0, f64::max)
}

/// Sample standard deviation of the values; 0 with fewer than two values.
pub fn sample_deviation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Spread of error rates over non-empty leaves.
pub fn error_rate_deviation(leaves: &[LeafAggregate]) -> f64 {
    let rates: Vec<f64> = leaves.iter().filter_map(error_rate).collect();
    sample_deviation(&rates)
}

/// Score a candidate's leaves under a criterion.
///
/// Returns `None` when the criterion is disabled.
pub fn score(
    criterion: SuggestionCriterion,
    leaves: &[LeafAggregate],
    total_size: usize,
) -> Option<f64> {
    match criterion {
        SuggestionCriterion::None => None,
        SuggestionCriterion::Entropy => Some(weighted_entropy(leaves, total_size)),
        SuggestionCriterion::ErrorCount => Some(max_error_count(leaves)),
        SuggestionCriterion::ErrorPercent => Some(max_error_rate(leaves)),
        SuggestionCriterion::ErrorDeviation => Some(error_rate_deviation(leaves)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq_f64;
    use crate::tree::{Outcome, PredictionResults, Tally};

    fn counts(pairs: &[(&str, usize)]) -> Counts {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn leaf(size: usize, incorrect: usize) -> LeafAggregate {
        let results = PredictionResults::from([(
            "A".to_string(),
            Outcome {
                correct: size - incorrect,
                incorrect,
            },
        )]);
        LeafAggregate(Tally {
            label_counts: counts(&[("A", size)]),
            size,
            prediction_counts: None,
            prediction_results: Some(results),
        })
    }

    #[test]
    fn entropy_bounds() {
        assert_eq!(entropy(&counts(&[("A", 10)]), 10), 0.0);
        assert_eq!(entropy(&counts(&[("A", 10), ("B", 0)]), 10), 0.0);
        assert_approx_eq_f64!(entropy(&counts(&[("A", 5), ("B", 5)]), 10), 1.0, 1e-12);
        assert_approx_eq_f64!(
            entropy(&counts(&[("A", 3), ("B", 3), ("C", 3), ("D", 3)]), 12),
            2.0,
            1e-12
        );
        assert_approx_eq_f64!(
            entropy(&counts(&[("A", 1), ("B", 1), ("C", 1)]), 3),
            3f64.log2(),
            1e-12
        );
        assert_eq!(entropy(&Counts::new(), 0), 0.0);
    }

    #[test]
    fn weighted_entropy_uses_total_size() {
        let pure = LeafAggregate(Tally {
            label_counts: counts(&[("A", 60)]),
            size: 60,
            ..Default::default()
        });
        let mixed = LeafAggregate(Tally {
            label_counts: counts(&[("A", 20), ("B", 20)]),
            size: 40,
            ..Default::default()
        });
        let h = weighted_entropy(&[pure, mixed], 100);
        assert_approx_eq_f64!(h, 0.4, 1e-12);
        assert_eq!(weighted_entropy(&[], 0), 0.0);
    }

    #[test]
    fn error_aggregates_skip_empty_leaves() {
        let leaves = [leaf(10, 5), leaf(100, 5), leaf(0, 0)];
        assert_eq!(max_error_count(&leaves), 5.0);
        assert_approx_eq_f64!(max_error_rate(&leaves), 0.5, 1e-12);
        // rates 0.5 and 0.05
        assert_approx_eq_f64!(
            error_rate_deviation(&leaves),
            (0.45f64.powi(2) / 2.0).sqrt(),
            1e-12
        );
    }

    #[test]
    fn aggregates_fall_back_to_zero() {
        let empty = [leaf(0, 0), leaf(0, 0)];
        assert_eq!(max_error_count(&empty), 0.0);
        assert_eq!(max_error_rate(&empty), 0.0);
        assert_eq!(error_rate_deviation(&empty), 0.0);
        assert_eq!(error_rate_deviation(&[leaf(4, 1)]), 0.0);
        assert_eq!(sample_deviation(&[]), 0.0);
    }

    #[test]
    fn sample_deviation_matches_definition() {
        assert_approx_eq_f64!(sample_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.138089935299395, 1e-12);
    }

    #[test]
    fn score_dispatch() {
        let leaves = [leaf(10, 5)];
        assert_eq!(score(SuggestionCriterion::None, &leaves, 10), None);
        assert_eq!(score(SuggestionCriterion::ErrorCount, &leaves, 10), Some(5.0));
        assert_eq!(score(SuggestionCriterion::Entropy, &leaves, 10), Some(0.0));
    }
}
