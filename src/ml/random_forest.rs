//! Random forest classifier.
//!
//! Trees are grown in parallel with rayon. Tree `i` draws its bootstrap sample
//! and feature subsets from `StdRng::seed_from_u64(random_state + i)`, so the
//! forest is identical no matter how rayon schedules the work.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::MLError;
use crate::ml::gradient_boosting::validate_training_input;
use crate::ml::tree::{ClassificationTree, TreeParams};

/// Hyperparameters for [`RandomForestClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestConfig {
    /// Number of trees.
    pub n_estimators: usize,
    /// Maximum depth of each tree.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
    /// Features considered per split. `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample for every tree.
    pub bootstrap: bool,
    /// Base seed. Tree `i` uses `random_state + i`.
    pub random_state: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: Some(10),
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            random_state: 42,
        }
    }
}

/// Ensemble of Gini classification trees averaged at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    n_classes: usize,
    trees: Vec<ClassificationTree>,
}

impl RandomForestClassifier {
    /// Fit on feature rows `x` with encoded labels `y` in `0..n_classes`.
    pub fn fit(
        config: &RandomForestConfig,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        validate_training_input(x, y, n_classes)?;
        if config.n_estimators == 0 {
            return Err(MLError::TrainingFailed {
                message: "random forest needs at least one tree".to_string(),
            }
            .into());
        }

        let n = y.len();
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let max_features = config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1));
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        };

        let trees: Vec<ClassificationTree> = (0..config.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.random_state.wrapping_add(i as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                ClassificationTree::fit(x, y, n_classes, &indices, params, max_features, &mut rng)
            })
            .collect();

        debug!(
            "Random forest fitted: {} trees, {} features per split",
            trees.len(),
            max_features
        );

        Ok(Self { n_classes, trees })
    }

    /// Mean of the per-tree leaf distributions.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }

        for tree in &self.trees {
            for (total, p) in proba.iter_mut().zip(tree.predict_proba(features)) {
                *total += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    /// Check that the forest has trees and every leaf holds a distribution
    /// over exactly `n_classes` classes.
    pub fn validate(&self) -> Result<()> {
        if self.n_classes == 0 || self.trees.is_empty() {
            return Err(MLError::ModelNotTrained {
                message: format!(
                    "forest of {} trees over {} classes",
                    self.trees.len(),
                    self.n_classes
                ),
            }
            .into());
        }

        let n_classes = self.n_classes;
        let well_formed = |distribution: &Vec<f64>| {
            distribution.len() == n_classes && distribution.iter().all(|p| p.is_finite())
        };
        if !self.trees.iter().all(|tree| tree.root().all_leaves(&well_formed)) {
            return Err(MLError::ModelNotTrained {
                message: format!("leaf distribution does not cover {n_classes} classes"),
            }
            .into());
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for class in 0..3 {
            for j in 0..8 {
                let mut row = vec![0.0; 4];
                row[class] = 1.0 - j as f64 * 0.05;
                row[3] = 0.2;
                x.push(row);
                y.push(class);
            }
        }
        (x, y)
    }

    #[test]
    fn test_forest_predictions() {
        let (x, y) = toy_data();
        let forest = RandomForestClassifier::fit(&RandomForestConfig::default(), &x, &y, 3).unwrap();

        assert_eq!(forest.n_trees(), 100);
        assert_eq!(forest.n_classes(), 3);

        let mut correct = 0;
        for (row, &label) in x.iter().zip(&y) {
            let proba = forest.predict_proba(row);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
            if crate::ml::argmax(&proba) == Some(label) {
                correct += 1;
            }
        }
        assert!(correct >= 20, "only {correct}/24 training rows recovered");
    }

    #[test]
    fn test_reproducible_across_runs() {
        let (x, y) = toy_data();
        let config = RandomForestConfig {
            n_estimators: 16,
            ..Default::default()
        };
        let a = RandomForestClassifier::fit(&config, &x, &y, 3).unwrap();
        let b = RandomForestClassifier::fit(&config, &x, &y, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class() {
        let x = vec![vec![0.1], vec![0.4], vec![0.9]];
        let forest = RandomForestClassifier::fit(&RandomForestConfig::default(), &x, &[0, 0, 0], 1)
            .unwrap();
        assert_eq!(forest.predict_proba(&[0.5]), vec![1.0]);
    }

    #[test]
    fn test_validate_checks_leaf_distributions() {
        let (x, y) = toy_data();
        let config = RandomForestConfig {
            n_estimators: 4,
            ..Default::default()
        };
        let forest = RandomForestClassifier::fit(&config, &x, &y, 3).unwrap();
        assert!(forest.validate().is_ok());

        let mut state = serde_json::to_value(&forest).unwrap();
        state["n_classes"] = serde_json::json!(4);
        let widened: RandomForestClassifier = serde_json::from_value(state).unwrap();
        assert!(widened.validate().is_err());

        let mut state = serde_json::to_value(&forest).unwrap();
        state["trees"] = serde_json::json!([]);
        let empty: RandomForestClassifier = serde_json::from_value(state).unwrap();
        assert!(empty.validate().is_err());

        let no_trees = RandomForestConfig {
            n_estimators: 0,
            ..Default::default()
        };
        assert!(RandomForestClassifier::fit(&no_trees, &x, &y, 3).is_err());
    }
}
