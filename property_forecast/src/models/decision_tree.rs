//! Regression tree model
//!
//! Nodes are stored as parallel arrays indexed by node id, root at 0. A leaf
//! has `-1` for both children. At an internal node a sample goes left when
//! `x[feature] <= threshold`.

use crate::error::{ForecastError, Result};
use crate::models::{check_width, PriceModel};
use serde::{Deserialize, Serialize};

/// Child index marking a leaf
const LEAF: i64 = -1;

/// Regression tree in array-of-nodes layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Number of input features, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    /// Left child of each node, `-1` for leaves
    pub children_left: Vec<i64>,
    /// Right child of each node, `-1` for leaves
    pub children_right: Vec<i64>,
    /// Split feature of each node (ignored for leaves)
    pub feature: Vec<i64>,
    /// Split threshold of each node (ignored for leaves)
    pub threshold: Vec<f64>,
    /// Predicted value of each node (used at leaves)
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// A tree with a single leaf
    pub fn constant(value: f64, n_features: Option<usize>) -> Self {
        Self {
            n_features,
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.value.len()
    }

    /// Check the node arrays for structural consistency
    pub fn validate(&self) -> Result<()> {
        let n = self.n_nodes();
        if n == 0 {
            return Err(ForecastError::ValidationError(
                "Decision tree has no nodes".to_string(),
            ));
        }

        let lengths = [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ];
        if lengths.iter().any(|len| *len != n) {
            return Err(ForecastError::ValidationError(format!(
                "Decision tree arrays differ in length: value={}, others={:?}",
                n, lengths
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                if !self.value[node].is_finite() {
                    return Err(ForecastError::ValidationError(format!(
                        "Leaf {} has a non-finite value",
                        node
                    )));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ForecastError::ValidationError(format!(
                        "Node {} has invalid child {}",
                        node, child
                    )));
                }
            }

            let feature = self.feature[node];
            let out_of_range = match self.n_features {
                Some(width) => feature >= width as i64,
                None => false,
            };
            if feature < 0 || out_of_range {
                return Err(ForecastError::ValidationError(format!(
                    "Node {} splits on invalid feature {}",
                    node, feature
                )));
            }
        }

        Ok(())
    }
}

impl PriceModel for DecisionTree {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self.n_features, features)?;

        let mut node = 0usize;
        // Children always have larger ids than their parent, so a walk
        // visits at most n_nodes nodes.
        for _ in 0..self.n_nodes() {
            let (left, right) = match (
                self.children_left.get(node),
                self.children_right.get(node),
            ) {
                (Some(left), Some(right)) => (*left, *right),
                _ => {
                    return Err(ForecastError::PredictionFailed(format!(
                        "Node {} out of bounds",
                        node
                    )))
                }
            };

            if left == LEAF && right == LEAF {
                return self.value.get(node).copied().ok_or_else(|| missing(node, "value"));
            }

            let feature = *self.feature.get(node).ok_or_else(|| missing(node, "feature"))?;
            let threshold = *self
                .threshold
                .get(node)
                .ok_or_else(|| missing(node, "threshold"))?;

            let x = usize::try_from(feature)
                .ok()
                .and_then(|feature| features.get(feature))
                .ok_or_else(|| {
                    ForecastError::PredictionFailed(format!(
                        "Split on feature {} but only {} features given",
                        feature,
                        features.len()
                    ))
                })?;

            let next = if *x <= threshold { left } else { right };
            node = usize::try_from(next).map_err(|_| {
                ForecastError::PredictionFailed(format!("Node {} has invalid child {}", node, next))
            })?;
        }

        Err(ForecastError::PredictionFailed(
            "Tree traversal did not reach a leaf".to_string(),
        ))
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn name(&self) -> &str {
        "Decision Tree"
    }
}

fn missing(node: usize, array: &str) -> ForecastError {
    ForecastError::PredictionFailed(format!("Node {} has no {} entry", node, array))
}
