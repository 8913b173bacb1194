//! Partition tree nodes and per-subset tallies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, Metadata};

/// Count per label (or predicted label) value. Only non-zero entries appear.
pub type Counts = BTreeMap<String, usize>;

/// Per-class prediction outcome for rows whose true label is that class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub correct: usize,
    pub incorrect: usize,
}

impl Outcome {
    /// Rows tallied.
    #[inline]
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }
}

/// True label → prediction outcome.
pub type PredictionResults = BTreeMap<String, Outcome>;

/// Which distribution a renderer colours a node by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountsView {
    #[default]
    GroundTruth,
    Predictions,
}

// =============================================================================
// Tally
// =============================================================================

/// Aggregates of one row subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub label_counts: Counts,
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_counts: Option<Counts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_results: Option<PredictionResults>,
}

impl Tally {
    /// Tally the label (and, if supplied, prediction) columns over `rows`.
    pub fn of_rows(metadata: &Metadata, dataset: &Dataset, rows: &[usize]) -> Self {
        let label_col = metadata.label_column();
        let mut label_counts = Counts::new();
        for &row in rows {
            *label_counts
                .entry(dataset.value(row, label_col).category_key())
                .or_default() += 1;
        }

        let (prediction_counts, prediction_results) = match metadata.prediction_column() {
            Some(pred_col) => {
                let mut counts = Counts::new();
                let mut results = PredictionResults::new();
                for &row in rows {
                    let truth = dataset.value(row, label_col).category_key();
                    let predicted = dataset.value(row, pred_col).category_key();
                    let outcome = results.entry(truth.clone()).or_default();
                    if predicted == truth {
                        outcome.correct += 1;
                    } else {
                        outcome.incorrect += 1;
                    }
                    *counts.entry(predicted).or_default() += 1;
                }
                (Some(counts), Some(results))
            }
            None => (None, None),
        };

        Self {
            label_counts,
            size: rows.len(),
            prediction_counts,
            prediction_results,
        }
    }

    /// Incorrect predictions summed over all classes; 0 without predictions.
    pub fn incorrect(&self) -> usize {
        self.prediction_results
            .as_ref()
            .map_or(0, |r| r.values().map(|o| o.incorrect).sum())
    }
}

// =============================================================================
// PartitionNode
// =============================================================================

/// One node of a partition tree.
///
/// `children` is `None` exactly at leaves, which all sit at depth
/// `selection.len()`. `value` is the renderer's sizing quantity: the leaf
/// size at leaves and the sum of the children's values above them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionNode {
    #[serde(flatten)]
    pub tally: Tally,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PartitionNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_size: Option<usize>,
    pub value: usize,
}

impl PartitionNode {
    /// Number of rows under this node.
    #[inline]
    pub fn size(&self) -> usize {
        self.tally.size
    }

    /// Label counts under this node.
    #[inline]
    pub fn label_counts(&self) -> &Counts {
        &self.tally.label_counts
    }

    /// Returns true for leaves.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in split order; empty for leaves.
    pub fn children(&self) -> &[PartitionNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Ground-truth or predicted counts, for the matrix "show predictions"
    /// toggle. Falls back to ground truth when no predictions were supplied.
    pub fn counts(&self, view: CountsView) -> &Counts {
        match (view, &self.tally.prediction_counts) {
            (CountsView::Predictions, Some(counts)) => counts,
            _ => &self.tally.label_counts,
        }
    }

    /// Longest path from this node down to a leaf.
    pub fn height(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&PartitionNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a PartitionNode>) {
        match &self.children {
            None => out.push(self),
            Some(children) => children.iter().for_each(|c| c.collect_leaves(out)),
        }
    }

    /// Pre-order traversal yielding `(depth, node)`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![(0, self)],
        }
    }

    /// Largest leaf value; sizes the matrix cells.
    pub fn max_leaf_value(&self) -> usize {
        self.leaves().iter().map(|l| l.value).max().unwrap_or(0)
    }

    /// Recompute `value` bottom-up over the whole subtree.
    pub(crate) fn sum_values(&mut self) -> usize {
        self.value = match &mut self.children {
            None => self.leaf_size.unwrap_or(self.tally.size),
            Some(children) => children.iter_mut().map(PartitionNode::sum_values).sum(),
        };
        self.value
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    stack: Vec<(usize, &'a PartitionNode)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (usize, &'a PartitionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::data::Value;

    fn leaf(size: usize, label: &str) -> PartitionNode {
        PartitionNode {
            tally: Tally {
                label_counts: Counts::from([("A".to_string(), size)]),
                size,
                ..Default::default()
            },
            split_feature: Some("f".into()),
            split_label: Some(label.into()),
            children: None,
            leaf_size: Some(size),
            value: 0,
        }
    }

    fn two_level() -> PartitionNode {
        let mut root = PartitionNode {
            tally: Tally {
                label_counts: Counts::from([("A".to_string(), 5)]),
                size: 5,
                ..Default::default()
            },
            split_feature: None,
            split_label: None,
            children: Some(vec![leaf(2, "low"), leaf(0, "medium"), leaf(3, "high")]),
            leaf_size: None,
            value: 0,
        };
        root.sum_values();
        root
    }

    #[test]
    fn values_sum_bottom_up() {
        let root = two_level();
        assert_eq!(root.value, 5);
        assert_eq!(root.children()[2].value, 3);
        assert_eq!(root.max_leaf_value(), 3);
        assert_eq!(root.height(), 1);
    }

    #[test]
    fn leaves_and_descendants_are_ordered() {
        let root = two_level();
        let labels: Vec<_> = root
            .leaves()
            .iter()
            .map(|l| l.split_label.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["low", "medium", "high"]);

        let depths: Vec<usize> = root.descendants().map(|(d, _)| d).collect();
        assert_eq!(depths, vec![0, 1, 1, 1]);
        let second = root.descendants().nth(1).unwrap().1;
        assert_eq!(second.split_label.as_deref(), Some("low"));
    }

    #[test]
    fn tally_with_predictions() {
        let ds = Dataset::from_rows(
            ["f", "predicted", "label"],
            vec![
                vec![Value::from(1.0), Value::from("A"), Value::from("A")],
                vec![Value::from(2.0), Value::from("B"), Value::from("A")],
                vec![Value::from(3.0), Value::from("B"), Value::from("B")],
            ],
        )
        .unwrap();
        let config = ExplorerConfig::builder()
            .prediction_column("predicted")
            .build()
            .unwrap();
        let meta = Metadata::from_dataset(&ds, &config).unwrap();

        let tally = Tally::of_rows(&meta, &ds, &[0, 1, 2]);
        assert_eq!(tally.size, 3);
        assert_eq!(tally.label_counts["A"], 2);
        assert_eq!(tally.prediction_counts.as_ref().unwrap()["B"], 2);
        let results = tally.prediction_results.as_ref().unwrap();
        assert_eq!(results["A"], Outcome { correct: 1, incorrect: 1 });
        assert_eq!(results["B"], Outcome { correct: 1, incorrect: 0 });
        assert_eq!(tally.incorrect(), 1);
    }

    #[test]
    fn tally_without_predictions() {
        let ds = Dataset::from_rows(
            ["f", "label"],
            vec![vec![Value::from(1.0), Value::from("A")]],
        )
        .unwrap();
        let meta = Metadata::from_dataset(&ds, &ExplorerConfig::default()).unwrap();
        let tally = Tally::of_rows(&meta, &ds, &[0]);
        assert_eq!(tally.prediction_results, None);
        assert_eq!(tally.incorrect(), 0);

        let empty = Tally::of_rows(&meta, &ds, &[]);
        assert_eq!(empty.size, 0);
        assert!(empty.label_counts.is_empty());
    }

    #[test]
    fn counts_view_falls_back_to_ground_truth() {
        let root = two_level();
        assert_eq!(root.counts(CountsView::Predictions), root.label_counts());
    }
}
