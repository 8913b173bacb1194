//! Threshold computation and value-to-bin mapping for quantitative features.
//!
//! Two strategies are supported:
//! - [`BinningStrategy::EqualInterval`] - cut points evenly spaced over the
//!   feature's extent
//! - [`BinningStrategy::Quantile`] - cut points at empirical quantiles of the
//!   full column
//!
//! Thresholds are computed once per feature over the whole dataset and reused
//! for every subset the feature later splits, so a bin means the same value
//! range at every depth of a tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// BinningStrategy
// ============================================================================

/// Which threshold set quantitative splits use.
///
/// One strategy applies to every quantitative feature of a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinningStrategy {
    /// Evenly spaced cut points over `[min, max]`.
    #[default]
    #[serde(rename = "interval")]
    EqualInterval,
    /// Cut points at the `i / n_bins` quantiles.
    #[serde(rename = "quantile")]
    Quantile,
}

impl BinningStrategy {
    /// Name used by selection widgets and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            BinningStrategy::EqualInterval => "interval",
            BinningStrategy::Quantile => "quantile",
        }
    }
}

impl fmt::Display for BinningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown binning strategy: {0:?} (expected \"interval\" or \"quantile\")")]
pub struct UnknownStrategy(pub String);

impl FromStr for BinningStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interval" | "equal_interval" => Ok(BinningStrategy::EqualInterval),
            "quantile" => Ok(BinningStrategy::Quantile),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

// ============================================================================
// Threshold computation
// ============================================================================

/// Minimum and maximum of the finite values, or `None` if there are none.
pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Cut points splitting `[min, max]` into `n_bins` equal-width intervals.
///
/// Returns `n_bins - 1` thresholds `min + k * (max - min) / n_bins`. A
/// degenerate extent (`min == max`) has no interior and yields no thresholds;
/// every value then falls into the first bin.
pub fn equal_interval_thresholds((min, max): (f64, f64), n_bins: usize) -> Vec<f64> {
    if n_bins < 2 || !(max > min) {
        return Vec::new();
    }
    let bin_width = (max - min) / n_bins as f64;
    (1..n_bins).map(|k| min + k as f64 * bin_width).collect()
}

/// The `p`-quantile of sorted values, interpolating linearly between the two
/// nearest order statistics (R-7).
///
/// `sorted` must be ascending. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }

    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let lo = sorted[i0];
    let hi = sorted[(i0 + 1).min(n - 1)];
    Some(lo + (hi - lo) * (i - i0 as f64))
}

/// Cut points at the empirical quantiles `i / n_bins`, `i = 1..n_bins`.
///
/// Non-finite values are ignored. Returns no thresholds when there are no
/// finite values.
pub fn quantile_thresholds(values: &[f64], n_bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || n_bins < 2 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    (1..n_bins)
        .filter_map(|i| quantile_sorted(&sorted, i as f64 / n_bins as f64))
        .collect()
}

// ============================================================================
// BinEdges
// ============================================================================

/// Ordered cut points mapping values onto a fixed number of bins.
///
/// Value `v` maps to bin `k` = number of thresholds `<= v`, so bins are the
/// half-open intervals `[t[k-1], t[k])` with the last bin closed. Duplicate
/// thresholds (common for quantiles of skewed columns) leave the bins between
/// them empty rather than shifting later bins down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    thresholds: Box<[f64]>,
    n_bins: usize,
}

impl BinEdges {
    /// Create edges for `n_bins` bins.
    ///
    /// When the feature's extent is degenerate the thresholds are dropped and
    /// all values map to bin 0.
    pub fn new(mut thresholds: Vec<f64>, extent: (f64, f64), n_bins: usize) -> Self {
        let n_bins = n_bins.max(1);
        if !(extent.1 > extent.0) {
            thresholds.clear();
        }
        thresholds.truncate(n_bins - 1);
        thresholds.sort_by(f64::total_cmp);
        Self {
            thresholds: thresholds.into_boxed_slice(),
            n_bins,
        }
    }

    /// Equal-interval edges for a column extent.
    pub fn equal_interval(extent: (f64, f64), n_bins: usize) -> Self {
        Self::new(equal_interval_thresholds(extent, n_bins), extent, n_bins)
    }

    /// Quantile edges over a full column.
    pub fn quantile(values: &[f64], n_bins: usize) -> Self {
        let ext = extent(values).unwrap_or((0.0, 0.0));
        Self::new(quantile_thresholds(values, n_bins), ext, n_bins)
    }

    /// The cut points, ascending.
    #[inline]
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Number of bins (always at least one).
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Returns true if all values collapse into a single bin.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Bin index for a value.
    #[inline]
    pub fn value_to_bin(&self, value: f64) -> usize {
        let bin = self.thresholds.partition_point(|&t| t <= value);
        bin.min(self.n_bins - 1)
    }
}
