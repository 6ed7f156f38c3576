//! Gaussian naive Bayes classifier loaded from a JSON artefact.
//!
//! The artefact carries the fitted parameters of a two-class Gaussian NB:
//! class priors plus a per-class mean and variance for every schema feature.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::ModelLoadError;
use crate::features::domain::{FeatureVector, FEATURE_COUNT, FEATURE_SCHEMA};

use super::domain::{ClassLabel, ClassProbabilities, Classification, Predictor, PredictorError};

/// On-disk parameter layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbArtifact {
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub model_version: String,
    /// Class labels in column order; must be `[0, 1]`.
    pub classes: Vec<u8>,
    pub class_prior: Vec<f64>,
    /// Per-class feature means, `classes.len()` rows of `FEATURE_COUNT`.
    pub theta: Vec<Vec<f64>>,
    /// Per-class feature variances, same shape as `theta`.
    pub var: Vec<Vec<f64>>,
    /// Optional column names; must equal the feature schema when present.
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// Validated Gaussian NB predictor. Immutable once built.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    model_id: String,
    model_version: String,
    log_prior: [f64; 2],
    theta: [Vec<f64>; 2],
    var: [Vec<f64>; 2],
    /// `-0.5 * sum(ln(2 * pi * var))` per class.
    log_norm: [f64; 2],
}

impl GaussianNb {
    pub fn from_artifact(artifact: GaussianNbArtifact) -> Result<Self, ModelLoadError> {
        validate(&artifact)?;

        let GaussianNbArtifact {
            model_id,
            model_version,
            class_prior,
            theta,
            var,
            ..
        } = artifact;

        let mut theta = theta.into_iter();
        let mut var = var.into_iter();
        let (theta_0, theta_1) = (
            theta.next().unwrap_or_default(),
            theta.next().unwrap_or_default(),
        );
        let (var_0, var_1) = (
            var.next().unwrap_or_default(),
            var.next().unwrap_or_default(),
        );

        Ok(Self {
            model_id,
            model_version,
            log_prior: [class_prior[0].ln(), class_prior[1].ln()],
            log_norm: [log_normaliser(&var_0), log_normaliser(&var_1)],
            theta: [theta_0, theta_1],
            var: [var_0, var_1],
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let artifact: GaussianNbArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<[f64; 2], PredictorError> {
        let x = features.as_slice();
        if x.len() != FEATURE_COUNT {
            return Err(PredictorError::InvalidInput(format!(
                "expected {FEATURE_COUNT} features, got {}",
                x.len()
            )));
        }
        if let Some(idx) = x.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError::InvalidInput(format!(
                "feature '{}' is not a finite number",
                FEATURE_SCHEMA[idx]
            )));
        }

        let mut jll = [0.0; 2];
        for (class, out) in jll.iter_mut().enumerate() {
            let mahalanobis: f64 = x
                .iter()
                .zip(&self.theta[class])
                .zip(&self.var[class])
                .map(|((xi, mu), var)| (xi - mu).powi(2) / var)
                .sum();
            *out = self.log_prior[class] + self.log_norm[class] - 0.5 * mahalanobis;
        }

        // one class at -inf still has a well-defined posterior
        if jll.iter().any(|v| v.is_nan()) || jll.iter().all(|v| v.is_infinite()) {
            return Err(PredictorError::InvalidInput(
                "feature values are too extreme to score".to_string(),
            ));
        }
        Ok(jll)
    }
}

fn validate(artifact: &GaussianNbArtifact) -> Result<(), ModelLoadError> {
    if artifact.classes != [0, 1] {
        return Err(ModelLoadError::InvalidParameter(format!(
            "classes must be [0, 1], got {:?}",
            artifact.classes
        )));
    }
    check_len("class_prior", 2, artifact.class_prior.len())?;
    for prior in &artifact.class_prior {
        if !prior.is_finite() || *prior <= 0.0 {
            return Err(ModelLoadError::InvalidParameter(format!(
                "class prior {prior} must be positive and finite"
            )));
        }
    }

    check_len("theta", 2, artifact.theta.len())?;
    check_len("var", 2, artifact.var.len())?;
    for row in &artifact.theta {
        check_len("theta row", FEATURE_COUNT, row.len())?;
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelLoadError::InvalidParameter(
                "theta contains a non-finite mean".to_string(),
            ));
        }
    }
    for row in &artifact.var {
        check_len("var row", FEATURE_COUNT, row.len())?;
        if let Some(v) = row.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(ModelLoadError::InvalidParameter(format!(
                "variance {v} must be positive and finite"
            )));
        }
    }

    if !artifact.feature_names.is_empty() {
        check_len("feature_names", FEATURE_COUNT, artifact.feature_names.len())?;
        for (index, (got, expected)) in artifact
            .feature_names
            .iter()
            .zip(FEATURE_SCHEMA.iter())
            .enumerate()
        {
            if got != expected {
                return Err(ModelLoadError::FeatureMismatch {
                    index,
                    expected: *expected,
                    got: got.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_len(field: &'static str, expected: usize, got: usize) -> Result<(), ModelLoadError> {
    if expected == got {
        Ok(())
    } else {
        Err(ModelLoadError::DimensionMismatch {
            field,
            expected,
            got,
        })
    }
}

fn log_normaliser(var: &[f64]) -> f64 {
    -0.5 * var.iter().map(|v| (2.0 * PI * v).ln()).sum::<f64>()
}

fn softmax_pair(jll: [f64; 2]) -> ClassProbabilities {
    let max = jll[0].max(jll[1]);
    let log_sum = max + ((jll[0] - max).exp() + (jll[1] - max).exp()).ln();
    ClassProbabilities {
        class_0: (jll[0] - log_sum).exp(),
        class_1: (jll[1] - log_sum).exp(),
    }
}

impl Predictor for GaussianNb {
    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, PredictorError> {
        self.classify(features).map(|c| c.label)
    }

    fn predict_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, PredictorError> {
        self.joint_log_likelihood(features).map(softmax_pair)
    }

    fn classify(&self, features: &FeatureVector) -> Result<Classification, PredictorError> {
        let jll = self.joint_log_likelihood(features)?;
        // ties go to the first class
        let label = if jll[1] > jll[0] {
            ClassLabel::One
        } else {
            ClassLabel::Zero
        };
        Ok(Classification {
            label,
            probabilities: softmax_pair(jll),
        })
    }
}
