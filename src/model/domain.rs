//! Predictor capability consumed by the inference service.
//!
//! Implementations must be immutable after construction: one instance is
//! shared behind an `Arc` and called concurrently from every request without
//! any locking.

use thiserror::Error;

use crate::features::domain::FeatureVector;

/// Binary class label produced by a predictor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClassLabel {
    Zero = 0,
    One = 1,
}

impl ClassLabel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Probability of each class, `(P(class 0), P(class 1))`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClassProbabilities {
    pub class_0: f64,
    pub class_1: f64,
}

/// Label and probabilities taken from a single predictor evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: ClassLabel,
    pub probabilities: ClassProbabilities,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictorError {
    /// The vector has the wrong shape or contains unusable values.
    #[error("{0}")]
    InvalidInput(String),
    /// Anything else that went wrong inside the predictor.
    #[error("{0}")]
    Internal(String),
}

/// Opaque classifier over a schema-ordered feature vector.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, PredictorError>;

    fn predict_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, PredictorError>;

    /// Label and probabilities together. Implementations that can derive both
    /// from one evaluation should override this.
    fn classify(&self, features: &FeatureVector) -> Result<Classification, PredictorError> {
        let label = self.predict(features)?;
        let probabilities = self.predict_probability(features)?;
        Ok(Classification {
            label,
            probabilities,
        })
    }
}
