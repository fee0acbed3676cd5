//! The persisted classifier artifact.
//!
//! The crop model ships as a JSON decision forest: each tree is a flat
//! node array walked from index 0, and the forest predicts by majority
//! vote. [`ForestModel::load`] validates the artifact up front so a
//! truncated or mismatched file fails at startup instead of on the
//! first request.

use std::path::Path;

use serde::Deserialize;

use crate::PredictionError;
use crate::features::FEATURE_COUNT;
use crate::labels::Crop;

/// The opaque classifier consumed by the prediction adapter.
pub trait CropClassifier: Send + Sync {
    /// Predicts a crop label for the assembled feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] when the model cannot evaluate the
    /// vector (a corrupt artifact reaching past validation).
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<u8, PredictionError>;
}

/// One node in a decision tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    /// Terminal node carrying a class label.
    Leaf {
        /// The predicted class.
        leaf: u8,
    },
    /// Binary split: `feature <= threshold` goes left, else right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One decision tree as a flat node array rooted at index 0.
#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Walks the tree for a feature vector.
    fn evaluate(&self, features: &[f64; FEATURE_COUNT]) -> Result<u8, PredictionError> {
        let mut index = 0;
        // Validation bounds every hop, so nodes.len() hops means a cycle.
        for _ in 0..=self.nodes.len() {
            match &self.nodes[index] {
                Node::Leaf { leaf } => return Ok(*leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(PredictionError::Artifact {
            message: "tree walk did not terminate".to_string(),
        })
    }
}

/// A decision forest deserialized from the persisted JSON artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    classes: u8,
    trees: Vec<Tree>,
}

impl ForestModel {
    /// Loads and validates the artifact.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the file cannot be read or parsed,
    /// or the forest fails structural validation.
    pub fn load(path: &Path) -> Result<Self, PredictionError> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        model.validate()?;
        Ok(model)
    }

    /// Parses an artifact from a JSON string (used by tests and
    /// embedded fixtures).
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if parsing or validation fails.
    pub fn from_json(raw: &str) -> Result<Self, PredictionError> {
        let model: Self = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    /// Number of trees in the forest.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Number of output classes the artifact declares.
    #[must_use]
    pub const fn class_count(&self) -> u8 {
        self.classes
    }

    fn validate(&self) -> Result<(), PredictionError> {
        if usize::from(self.classes) != Crop::COUNT {
            return Err(PredictionError::Artifact {
                message: format!(
                    "artifact declares {} classes, crop map has {}",
                    self.classes,
                    Crop::COUNT
                ),
            });
        }
        if self.trees.is_empty() {
            return Err(PredictionError::Artifact {
                message: "forest has no trees".to_string(),
            });
        }
        for (tree_index, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(PredictionError::Artifact {
                    message: format!("tree {tree_index} has no nodes"),
                });
            }
            for (node_index, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Leaf { leaf } => {
                        if *leaf >= self.classes {
                            return Err(PredictionError::Artifact {
                                message: format!(
                                    "tree {tree_index} node {node_index} leaf {leaf} out of range"
                                ),
                            });
                        }
                    }
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= FEATURE_COUNT
                            || *left >= tree.nodes.len()
                            || *right >= tree.nodes.len()
                        {
                            return Err(PredictionError::Artifact {
                                message: format!(
                                    "tree {tree_index} node {node_index} references out of range"
                                ),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl CropClassifier for ForestModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<u8, PredictionError> {
        let mut votes = [0_u32; Crop::COUNT];
        for tree in &self.trees {
            let label = tree.evaluate(features)?;
            votes[usize::from(label)] += 1;
        }
        let winner = votes
            .iter()
            .enumerate()
            .max_by_key(|(_, count)| **count)
            .map(|(label, _)| label)
            .unwrap_or_default();
        Ok(u8::try_from(winner).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two trees splitting on rainfall (index 2): dry fields vote
    /// Cotton, wet fields vote Rice.
    const FIXTURE: &str = r#"{
        "classes": 10,
        "trees": [
            {
                "nodes": [
                    { "feature": 2, "threshold": 900.0, "left": 1, "right": 2 },
                    { "leaf": 1 },
                    { "leaf": 5 }
                ]
            },
            {
                "nodes": [
                    { "feature": 2, "threshold": 600.0, "left": 1, "right": 2 },
                    { "leaf": 1 },
                    { "leaf": 5 }
                ]
            }
        ]
    }"#;

    fn features_with_rainfall(rainfall: f64) -> [f64; FEATURE_COUNT] {
        let mut features = [0.0; FEATURE_COUNT];
        features[2] = rainfall;
        features
    }

    #[test]
    fn majority_vote_over_trees() {
        let model = ForestModel::from_json(FIXTURE).unwrap();
        // 1200 mm: both trees vote Rice.
        assert_eq!(model.predict(&features_with_rainfall(1200.0)).unwrap(), 5);
        // 500 mm: both trees vote for the dry-field crop.
        assert_eq!(model.predict(&features_with_rainfall(500.0)).unwrap(), 1);
    }

    #[test]
    fn rejects_wrong_class_count() {
        let raw = FIXTURE.replace("\"classes\": 10", "\"classes\": 4");
        assert!(matches!(
            ForestModel::from_json(&raw).unwrap_err(),
            PredictionError::Artifact { .. }
        ));
    }

    #[test]
    fn rejects_out_of_range_references() {
        let raw = FIXTURE.replace("\"left\": 1, \"right\": 2", "\"left\": 9, \"right\": 2");
        assert!(matches!(
            ForestModel::from_json(&raw).unwrap_err(),
            PredictionError::Artifact { .. }
        ));
    }

    #[test]
    fn rejects_empty_forest() {
        let raw = r#"{ "classes": 10, "trees": [] }"#;
        assert!(matches!(
            ForestModel::from_json(raw).unwrap_err(),
            PredictionError::Artifact { .. }
        ));
    }
}
