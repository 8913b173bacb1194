//! Suggestion criteria.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rule used to rank candidate next features.
///
/// Parsing never fails: unrecognised names map to [`SuggestionCriterion::None`],
/// which disables suggestions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SuggestionCriterion {
    /// Suggestions disabled.
    #[default]
    None,
    /// Lowest size-weighted label entropy over the leaves.
    Entropy,
    /// Largest incorrect-prediction count in a single leaf.
    ErrorCount,
    /// Largest incorrect-prediction rate in a single leaf.
    ErrorPercent,
    /// Largest spread (sample standard deviation) of leaf error rates.
    ErrorDeviation,
}

/// Whether a criterion prefers low or high scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Optimum {
    Minimize,
    Maximize,
}

impl Optimum {
    /// Score a candidate must beat to be suggested at all.
    ///
    /// Any finite entropy beats `+inf`; error scores must be positive, so
    /// a selection without errors or spread suggests nothing.
    #[inline]
    pub fn baseline(self) -> f64 {
        match self {
            Optimum::Minimize => f64::INFINITY,
            Optimum::Maximize => 0.0,
        }
    }

    /// Returns true if `candidate` strictly beats `best`.
    ///
    /// Strictness keeps the first-seen candidate on ties.
    #[inline]
    pub fn improves(self, candidate: f64, best: f64) -> bool {
        match self {
            Optimum::Minimize => candidate < best,
            Optimum::Maximize => candidate > best,
        }
    }
}

impl SuggestionCriterion {
    /// All criteria, `None` first.
    pub const ALL: [SuggestionCriterion; 5] = [
        SuggestionCriterion::None,
        SuggestionCriterion::Entropy,
        SuggestionCriterion::ErrorCount,
        SuggestionCriterion::ErrorPercent,
        SuggestionCriterion::ErrorDeviation,
    ];

    /// Name used by selection widgets and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionCriterion::None => "none",
            SuggestionCriterion::Entropy => "entropy",
            SuggestionCriterion::ErrorCount => "errorCount",
            SuggestionCriterion::ErrorPercent => "errorPercent",
            SuggestionCriterion::ErrorDeviation => "errorDeviation",
        }
    }

    /// Parse a criterion name, mapping unknown names to `None`.
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or(SuggestionCriterion::None)
    }

    /// Direction of improvement, or `None` when suggestions are disabled.
    pub fn optimum(self) -> Option<Optimum> {
        match self {
            SuggestionCriterion::None => None,
            SuggestionCriterion::Entropy => Some(Optimum::Minimize),
            SuggestionCriterion::ErrorCount
            | SuggestionCriterion::ErrorPercent
            | SuggestionCriterion::ErrorDeviation => Some(Optimum::Maximize),
        }
    }

    /// Returns true unless suggestions are disabled.
    #[inline]
    pub fn is_enabled(self) -> bool {
        self != SuggestionCriterion::None
    }
}

impl fmt::Display for SuggestionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SuggestionCriterion {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for SuggestionCriterion {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<SuggestionCriterion> for String {
    fn from(c: SuggestionCriterion) -> Self {
        c.as_str().to_string()
    }
}
