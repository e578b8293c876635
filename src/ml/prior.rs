//! Trivial prior classifier, the last-resort model.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::MLError;

/// Predicts the training class frequencies for every input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorClassifier {
    class_priors: Vec<f64>,
}

impl PriorClassifier {
    /// Fit class frequencies from encoded labels in `0..n_classes`.
    pub fn fit(y: &[usize], n_classes: usize) -> Result<Self> {
        if y.is_empty() || n_classes == 0 {
            return Err(MLError::InsufficientTrainingData {
                min_samples: 1,
                actual: y.len(),
            }
            .into());
        }

        let mut counts = vec![0usize; n_classes];
        for &label in y {
            let slot = counts.get_mut(label).ok_or_else(|| MLError::TrainingFailed {
                message: format!("label index {label} out of range for {n_classes} classes"),
            })?;
            *slot += 1;
        }

        let total = y.len() as f64;
        Ok(Self {
            class_priors: counts.into_iter().map(|c| c as f64 / total).collect(),
        })
    }

    /// A prior that always predicts the single class with certainty.
    pub fn certain() -> Self {
        Self {
            class_priors: vec![1.0],
        }
    }

    pub fn predict_proba(&self) -> Vec<f64> {
        self.class_priors.clone()
    }

    /// Check that the priors form a probability distribution.
    pub fn validate(&self) -> Result<()> {
        let total: f64 = self.class_priors.iter().sum();
        let valid = !self.class_priors.is_empty()
            && self.class_priors.iter().all(|p| p.is_finite() && *p >= 0.0)
            && (total - 1.0).abs() < 1e-6;
        if !valid {
            return Err(MLError::ModelNotTrained {
                message: format!("class priors {:?} are not a distribution", self.class_priors),
            }
            .into());
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.class_priors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priors() {
        let prior = PriorClassifier::fit(&[0, 1, 1, 2], 3).unwrap();
        assert_eq!(prior.predict_proba(), vec![0.25, 0.5, 0.25]);
        assert_eq!(prior.n_classes(), 3);
    }

    #[test]
    fn test_invalid() {
        assert!(PriorClassifier::fit(&[], 2).is_err());
        assert!(PriorClassifier::fit(&[4], 2).is_err());
        assert_eq!(PriorClassifier::certain().predict_proba(), vec![1.0]);
    }

    #[test]
    fn test_validate() {
        assert!(PriorClassifier::fit(&[0, 1, 1], 2).unwrap().validate().is_ok());
        let skewed: PriorClassifier =
            serde_json::from_str(r#"{"class_priors": [0.5, 0.7]}"#).unwrap();
        assert!(skewed.validate().is_err());
        let empty: PriorClassifier = serde_json::from_str(r#"{"class_priors": []}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
