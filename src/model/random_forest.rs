//! Random Forest
//!
//! Trees use scikit-learn's flat `tree_` layout: parallel arrays indexed by
//! node id, with `children_left[i] == -1` marking a leaf. A sample goes left
//! when `x[feature[i]] <= threshold[i]`.

use serde::Deserialize;

use super::ModelError;
use crate::features::N_FEATURES;

const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or weighted fractions)
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), String> {
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".into());
        }

        for (name, len) in [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("value", self.value.len()),
        ] {
            if len != n_nodes {
                return Err(format!("{} has {} nodes, expected {}", name, len, n_nodes));
            }
        }

        for node in 0..n_nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);

            let row = &self.value[node];
            if row.len() != n_classes {
                return Err(format!(
                    "node {} has {} class values, expected {} classes",
                    node,
                    row.len(),
                    n_classes
                ));
            }

            if left == LEAF {
                if row.iter().any(|v| !(*v >= 0.0)) || row.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has no positive class weight", node));
                }
                continue;
            }

            // Children must point forward so traversal always terminates
            for child in [left, right] {
                if child <= node as i64 || child >= n_nodes as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= N_FEATURES as i64 {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }

        Ok(())
    }

    /// Normalized class distribution at the leaf reached by `x`
    fn leaf_distribution(&self, x: &[f64; N_FEATURES]) -> impl Iterator<Item = f64> + '_ {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let row = &self.value[node];
        let total: f64 = row.iter().sum();
        row.iter().map(move |v| v / total)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub(crate) fn validate(&self, n_classes: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".into()));
        }

        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_classes)
                .map_err(|msg| ModelError::InvalidArtifact(format!("tree {}: {}", idx, msg)))?;
        }

        Ok(())
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> Vec<f64> {
        let n_classes = self.trees[0].value[0].len();
        let mut probs = vec![0.0; n_classes];

        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(tree.leaf_distribution(x)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        probs.iter_mut().for_each(|p| *p /= n_trees);
        probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Stump on rainfall (feature 6): <= 150 → class 1, else class 0
    fn rainfall_stump() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![6, -2, -2],
            threshold: vec![150.0, -2.0, -2.0],
            value: vec![vec![50.0, 50.0, 0.0], vec![5.0, 45.0, 0.0], vec![40.0, 10.0, 0.0]],
        }
    }

    /// Stump on temperature (feature 3): <= 20 → class 2, else class 1
    fn temperature_stump() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![3, -2, -2],
            threshold: vec![20.0, -2.0, -2.0],
            value: vec![vec![0.0, 1.0, 1.0], vec![0.0, 0.0, 4.0], vec![0.0, 3.0, 1.0]],
        }
    }

    fn sample(temperature: f64, rainfall: f64) -> [f64; N_FEATURES] {
        [90.0, 42.0, 43.0, temperature, 80.0, 6.5, rainfall]
    }

    #[test]
    fn test_threshold_goes_left_when_equal() {
        let forest = RandomForest { trees: vec![rainfall_stump()] };
        let probs = forest.predict_proba(&sample(25.0, 150.0));
        assert_relative_eq!(probs[1], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest { trees: vec![rainfall_stump(), temperature_stump()] };
        forest.validate(3).unwrap();

        let probs = forest.predict_proba(&sample(25.0, 200.0));
        // Tree 1: [0.8, 0.2, 0.0]; tree 2: [0.0, 0.75, 0.25]
        assert_relative_eq!(probs[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 0.475, epsilon = 1e-12);
        assert_relative_eq!(probs[2], 0.125, epsilon = 1e-12);
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = rainfall_stump();
        tree.children_left[0] = 0;
        let forest = RandomForest { trees: vec![tree] };
        assert!(forest.validate(3).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let mut tree = rainfall_stump();
        tree.feature[0] = 7;
        let forest = RandomForest { trees: vec![tree] };
        assert!(forest.validate(3).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_class_width() {
        let forest = RandomForest { trees: vec![rainfall_stump()] };
        assert!(forest.validate(22).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let forest = RandomForest { trees: vec![] };
        assert!(forest.validate(3).is_err());
    }
}
