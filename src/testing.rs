//! Testing utilities for featuretree.
//!
//! Assertion helpers and small dataset fixtures shared by unit tests,
//! integration tests, and benchmarks.
//!
//! ```ignore
//! use featuretree::testing::{assert_tree_invariants, synthetic_dataset};
//! ```

use approx::AbsDiffEq;

use crate::data::{Dataset, Value};
use crate::suggest::CandidateScore;
use crate::tree::PartitionNode;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for score comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are approximately equal.
///
/// Uses absolute difference comparison with the given tolerance.
///
/// # Examples
///
/// ```
/// # use featuretree::assert_approx_eq_f64;
/// assert_approx_eq_f64!(1.0f64, 1.0001f64, 0.001);
/// ```
#[macro_export]
macro_rules! assert_approx_eq_f64 {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two candidate rankings name the same features in the same
/// order with approximately equal scores.
///
/// # Panics
///
/// Panics on a length mismatch, a differing feature, or a score difference
/// above `epsilon`.
pub fn assert_scores_approx_eq(
    actual: &[CandidateScore],
    expected: &[CandidateScore],
    epsilon: f64,
    context: &str,
) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a.feature, e.feature, "{context}[{i}]: feature mismatch");
        assert!(
            a.score.abs_diff_eq(&e.score, epsilon),
            "{context}[{i}] {}: {} ≠ {} (diff={}, epsilon={epsilon})",
            a.feature,
            a.score,
            e.score,
            (a.score - e.score).abs()
        );
    }
}

// =============================================================================
// Tree Assertions
// =============================================================================

/// Assert the structural invariants of a partition tree.
///
/// - the root holds `n_rows` rows
/// - every node's size equals the sum of its label counts
/// - every internal node's size equals the sum of its children's sizes
/// - every leaf sits at `depth` and its `value` equals its size
/// - every internal node's `value` equals the sum of its children's values
///
/// # Panics
///
/// Panics with the offending node's path on the first violation.
pub fn assert_tree_invariants(root: &PartitionNode, depth: usize, n_rows: usize) {
    assert_eq!(root.size(), n_rows, "root size");
    check_node(root, 0, depth, "root");
}

fn check_node(node: &PartitionNode, level: usize, depth: usize, path: &str) {
    let counted: usize = node.label_counts().values().sum();
    assert_eq!(node.size(), counted, "{path}: size vs label counts");

    if node.is_leaf() {
        assert_eq!(level, depth, "{path}: leaf depth");
        assert_eq!(node.leaf_size, Some(node.size()), "{path}: leaf size");
        assert_eq!(node.value, node.size(), "{path}: leaf value");
        return;
    }

    assert!(level < depth, "{path}: internal node below selection depth");
    assert_eq!(node.leaf_size, None, "{path}: internal node has leaf size");

    let children = node.children();
    assert!(!children.is_empty(), "{path}: internal node without children");
    let child_sizes: usize = children.iter().map(PartitionNode::size).sum();
    let child_values: usize = children.iter().map(|c| c.value).sum();
    assert_eq!(node.size(), child_sizes, "{path}: size vs children");
    assert_eq!(node.value, child_values, "{path}: value vs children");

    for (i, child) in children.iter().enumerate() {
        let label = child.split_label.as_deref().unwrap_or("?");
        check_node(child, level + 1, depth, &format!("{path}/{i}:{label}"));
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A deterministic labeled dataset with mixed feature kinds.
///
/// Columns: `age` (numeric 18..=77), `income` (numeric with a heavy tail),
/// `color` (3 categories), `region` (5 categories), `predicted`, `label`.
/// Labels depend mostly on `age` so entropy-based suggestions prefer it.
/// `predicted` is wrong on every seventh row.
pub fn synthetic_dataset(n_rows: usize) -> Dataset {
    const COLORS: [&str; 3] = ["red", "green", "blue"];
    const REGIONS: [&str; 5] = ["north", "south", "east", "west", "central"];

    let rows = (0..n_rows)
        .map(|i| {
            let age = 18 + (i * 37) % 60;
            let income = ((i * 13) % 100) as f64 * if i % 10 == 0 { 50.0 } else { 1.0 };
            let label = if age < 40 { "young" } else { "old" };
            let predicted = match (i % 7 == 0, label) {
                (false, l) => l,
                (true, "young") => "old",
                (true, _) => "young",
            };
            vec![
                Value::from(age as f64),
                Value::from(income),
                Value::from(COLORS[i % COLORS.len()]),
                Value::from(REGIONS[(i / 3) % REGIONS.len()]),
                Value::from(predicted),
                Value::from(label),
            ]
        })
        .collect::<Vec<_>>();

    Dataset::from_rows(
        ["age", "income", "color", "region", "predicted", "label"],
        rows,
    )
    .expect("fixture columns are consistent")
    .with_name("synthetic")
}
