//! The estimator behind a trained model.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::MLError;
use crate::ml::gradient_boosting::GradientBoostingClassifier;
use crate::ml::prior::PriorClassifier;
use crate::ml::random_forest::RandomForestClassifier;

/// A classifier producing a probability per encoded class.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Class probabilities for one feature row.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Number of classes the output covers.
    fn n_classes(&self) -> usize;

    /// Get the name of this classifier.
    fn name(&self) -> &'static str;
}

/// Every estimator a [`TrainedModel`](crate::ml::TrainedModel) can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    GradientBoosting(GradientBoostingClassifier),
    RandomForest(RandomForestClassifier),
    Prior(PriorClassifier),
}

impl Estimator {
    /// Whether this is the trivial prior fallback.
    pub fn is_prior(&self) -> bool {
        matches!(self, Estimator::Prior(_))
    }

    /// Check the internal state of a deserialized estimator.
    pub fn validate(&self) -> Result<()> {
        match self {
            Estimator::GradientBoosting(model) => model.validate(),
            Estimator::RandomForest(model) => model.validate(),
            Estimator::Prior(model) => model.validate(),
        }
    }
}

impl ProbabilisticClassifier for Estimator {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        let proba = match self {
            Estimator::GradientBoosting(model) => model.predict_proba(features),
            Estimator::RandomForest(model) => model.predict_proba(features),
            Estimator::Prior(model) => model.predict_proba(),
        };

        if proba.iter().any(|p| !p.is_finite()) {
            return Err(MLError::InvalidFeatureVector {
                message: format!("{} produced a non-finite probability", self.name()),
            }
            .into());
        }
        Ok(proba)
    }

    fn n_classes(&self) -> usize {
        match self {
            Estimator::GradientBoosting(model) => model.n_classes(),
            Estimator::RandomForest(model) => model.n_classes(),
            Estimator::Prior(model) => model.n_classes(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Estimator::GradientBoosting(_) => "gradient_boosting",
            Estimator::RandomForest(_) => "random_forest",
            Estimator::Prior(_) => "prior",
        }
    }
}
