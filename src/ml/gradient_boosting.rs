//! Multiclass gradient boosted decision trees.
//!
//! Boosting minimizes the multinomial deviance. Each round fits one
//! [`RegressionTree`] per class to the residuals `y_k - p_k` of a row
//! subsample and sets every leaf to the Newton step
//! `(K - 1) / K · Σr / Σ|r|(1 - |r|)`.

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{EduSolveError, Result};
use crate::ml::MLError;
use crate::ml::tree::{RegressionTree, TreeParams};

/// Hyperparameters for [`GradientBoostingClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds.
    pub n_estimators: usize,
    /// Shrinkage applied to every tree.
    pub learning_rate: f64,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Fraction of rows drawn without replacement for each round.
    pub subsample: f64,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
    /// Seed for row subsampling.
    pub random_state: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 7,
            subsample: 0.8,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }
}

/// Gradient boosting classifier with a softmax link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    learning_rate: f64,
    n_classes: usize,
    /// Log class priors, the raw score before any tree.
    init_scores: Vec<f64>,
    /// `trees[round][class]`.
    trees: Vec<Vec<RegressionTree>>,
    /// Training deviance after each round.
    training_losses: Vec<f64>,
}

impl GradientBoostingClassifier {
    /// Fit on feature rows `x` with encoded labels `y` in `0..n_classes`.
    pub fn fit(
        config: &GradientBoostingConfig,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        validate_training_input(x, y, n_classes)?;

        let n = y.len();
        let mut class_counts = vec![0usize; n_classes];
        for &label in y {
            class_counts[label] += 1;
        }
        let init_scores: Vec<f64> = class_counts
            .iter()
            .map(|&c| (c as f64 / n as f64).max(1e-12).ln())
            .collect();

        let mut model = Self {
            learning_rate: config.learning_rate,
            n_classes,
            init_scores,
            trees: Vec::with_capacity(config.n_estimators),
            training_losses: Vec::with_capacity(config.n_estimators),
        };

        if n_classes == 1 {
            return Ok(model);
        }

        let params = TreeParams {
            max_depth: Some(config.max_depth),
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        };
        let n_inbag = ((config.subsample * n as f64) as usize).clamp(1, n);
        let mut rng = StdRng::seed_from_u64(config.random_state);
        let mut raw_scores: Vec<Vec<f64>> = vec![model.init_scores.clone(); n];
        let k_factor = (n_classes as f64 - 1.0) / n_classes as f64;

        for _ in 0..config.n_estimators {
            let probabilities: Vec<Vec<f64>> = raw_scores.iter().map(|r| softmax(r)).collect();

            let sample: Vec<usize> = if n_inbag < n {
                rand::seq::index::sample(&mut rng, n, n_inbag).into_vec()
            } else {
                (0..n).collect()
            };

            let mut round = Vec::with_capacity(n_classes);
            for class in 0..n_classes {
                let residuals: Vec<f64> = (0..n)
                    .map(|i| f64::from(u8::from(y[i] == class)) - probabilities[i][class])
                    .collect();

                let newton_step = |leaf: &[usize]| -> f64 {
                    let numerator: f64 = leaf.iter().map(|&i| residuals[i]).sum();
                    let denominator: f64 = leaf
                        .iter()
                        .map(|&i| residuals[i].abs() * (1.0 - residuals[i].abs()))
                        .sum();
                    if denominator.abs() < 1e-150 {
                        0.0
                    } else {
                        k_factor * numerator / denominator
                    }
                };

                let tree = RegressionTree::fit(x, &residuals, &sample, params, &newton_step);
                for (row, scores) in x.iter().zip(raw_scores.iter_mut()) {
                    scores[class] += model.learning_rate * tree.predict(row);
                }
                round.push(tree);
            }

            model.trees.push(round);
            model.training_losses.push(deviance(&raw_scores, y));
        }

        debug!(
            "Gradient boosting fitted: {} rounds x {} classes, final deviance {:.4}",
            model.trees.len(),
            n_classes,
            model.training_losses.last().copied().unwrap_or(0.0)
        );

        Ok(model)
    }

    /// Class probabilities for one feature row.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        if self.n_classes == 1 {
            return vec![1.0];
        }

        let mut scores = self.init_scores.clone();
        for round in &self.trees {
            for (score, tree) in scores.iter_mut().zip(round) {
                *score += self.learning_rate * tree.predict(features);
            }
        }
        softmax(&scores)
    }

    /// Check that every round has one tree per class and all parameters are finite.
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |message: String| -> EduSolveError { MLError::ModelNotTrained { message }.into() };

        if self.n_classes == 0 || self.init_scores.len() != self.n_classes {
            return Err(invalid(format!(
                "{} initial scores for {} classes",
                self.init_scores.len(),
                self.n_classes
            )));
        }
        if let Some(round) = self.trees.iter().position(|r| r.len() != self.n_classes) {
            return Err(invalid(format!(
                "round {round} has {} trees for {} classes",
                self.trees[round].len(),
                self.n_classes
            )));
        }
        let finite = self.learning_rate.is_finite()
            && self.init_scores.iter().all(|s| s.is_finite())
            && self
                .trees
                .iter()
                .flatten()
                .all(|tree| tree.root().all_leaves(&|v: &f64| v.is_finite()));
        if !finite {
            return Err(invalid("non-finite gradient boosting parameter".to_string()));
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }

    pub fn training_losses(&self) -> &[f64] {
        &self.training_losses
    }
}

/// Shared checks for ensemble training input.
pub(crate) fn validate_training_input(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
) -> Result<()> {
    if y.is_empty() {
        return Err(MLError::InsufficientTrainingData {
            min_samples: 1,
            actual: 0,
        }
        .into());
    }
    if x.len() != y.len() {
        return Err(MLError::InvalidFeatureVector {
            message: format!("{} feature rows for {} labels", x.len(), y.len()),
        }
        .into());
    }
    if let Some(&label) = y.iter().find(|&&label| label >= n_classes) {
        return Err(MLError::TrainingFailed {
            message: format!("label index {label} out of range for {n_classes} classes"),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

fn deviance(raw_scores: &[Vec<f64>], y: &[usize]) -> f64 {
    let total: f64 = raw_scores
        .iter()
        .zip(y)
        .map(|(scores, &label)| -softmax(scores)[label].max(1e-300).ln())
        .sum();
    total / y.len() as f64
}
