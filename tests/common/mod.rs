//! Dataset builders shared by integration tests.
//!
//! For assertion helpers, use `featuretree::testing`.

#![allow(dead_code)]

use featuretree::{Dataset, ExplorerConfig, Metadata, Value};

#[allow(unused_imports)]
pub use featuretree::assert_approx_eq_f64;
#[allow(unused_imports)]
pub use featuretree::testing::{
    assert_scores_approx_eq, assert_tree_invariants, synthetic_dataset, DEFAULT_TOLERANCE,
};

/// Describe a dataset with the default configuration.
pub fn describe(dataset: &Dataset) -> Metadata {
    Metadata::from_dataset(dataset, &ExplorerConfig::default()).expect("valid dataset")
}

/// Describe a dataset whose `predicted` column holds predicted labels.
pub fn describe_with_predictions(dataset: &Dataset) -> Metadata {
    let config = ExplorerConfig::builder()
        .prediction_column("predicted")
        .build()
        .expect("valid config");
    Metadata::from_dataset(dataset, &config).expect("valid dataset")
}

/// 100 rows, 60 labelled `A` then 40 labelled `B`, with a single feature `F`
/// that separates them perfectly.
pub fn sixty_forty() -> Dataset {
    let rows = (0..100).map(|i| {
        let (f, label) = if i < 60 { ("f1", "A") } else { ("f2", "B") };
        vec![Value::from(f), Value::from(label)]
    });
    Dataset::from_rows(["F", "label"], rows).expect("consistent rows")
}

/// `0..=9` in a single numeric column with a two-class label.
pub fn zero_to_nine() -> Dataset {
    let rows = (0..10).map(|i| {
        vec![
            Value::from(i),
            Value::from(if i % 2 == 0 { "even" } else { "odd" }),
        ]
    });
    Dataset::from_rows(["x", "label"], rows).expect("consistent rows")
}
