//! Next-feature suggestion.
//!
//! - [`SuggestionCriterion`] - how candidates are ranked
//! - [`score`] - entropy and error aggregates over leaves
//! - [`FeatureSuggester`] / [`suggest_next_feature`] - ranking and selection
//! - [`SuggestionWorker`] - off-thread request/response wrapper

mod criterion;
mod engine;
pub mod score;
mod worker;

pub use criterion::{Optimum, SuggestionCriterion};
pub use engine::{suggest_next_feature, CandidateScore, FeatureSuggester};
pub use worker::{SuggestionRequest, SuggestionResponse, SuggestionWorker, WorkerError};
