//! Error handling primitives shared across the core.
//!
//! `ErrorCode` is the stable table surfaced in logs; the typed enums below carry
//! the details and decide which code (and HTTP status) a failure maps to.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error codes written into every outcome log line.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Predictor artefact was not available.
    ModelMissing = 3,
    /// Input failed validation.
    InvalidInput = 4,
    /// Catch-all for bugs and unanticipated failures.
    Internal = 5,
}

impl ErrorCode {
    /// HTTP status class for the code.
    pub const fn http_status(self) -> u16 {
        match self {
            ErrorCode::Ok => 200,
            ErrorCode::InvalidInput => 400,
            ErrorCode::ModelMissing | ErrorCode::Internal => 500,
        }
    }
}

/// Failures a single `/predict` call can end in.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictError {
    #[error("Internal server error: Model not loaded.")]
    ModelNotLoaded,
    #[error("Request body must be a JSON object of feature values. Details: {0}")]
    MalformedBody(String),
    #[error("Missing feature in input data: {0}. Please provide all 43 features.")]
    MissingFeature(String),
    #[error("Incorrect number or type of features provided. Please check input. Details: {0}")]
    InvalidFeatureValue(String),
    #[error("An unexpected error occurred: {0}")]
    UnexpectedFailure(String),
}

impl PredictError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PredictError::ModelNotLoaded => ErrorCode::ModelMissing,
            PredictError::MalformedBody(_)
            | PredictError::MissingFeature(_)
            | PredictError::InvalidFeatureValue(_) => ErrorCode::InvalidInput,
            PredictError::UnexpectedFailure(_) => ErrorCode::Internal,
        }
    }

    /// Label used for the prediction outcome counter.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            PredictError::ModelNotLoaded => "model_not_loaded",
            PredictError::MalformedBody(_) => "malformed_body",
            PredictError::MissingFeature(_) => "missing_feature",
            PredictError::InvalidFeatureValue(_) => "invalid_value",
            PredictError::UnexpectedFailure(_) => "unexpected_failure",
        }
    }
}

/// Startup failures while reading or validating the model artefact.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file '{path}' could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artefact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} has {got} entries, expected {expected}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("feature_names[{index}] is '{got}', expected '{expected}'")]
    FeatureMismatch {
        index: usize,
        expected: &'static str,
        got: String,
    },
    #[error("invalid model parameter: {0}")]
    InvalidParameter(String),
}

/// Result alias used by the prediction path.
pub type PredictResult<T> = Result<T, PredictError>;
