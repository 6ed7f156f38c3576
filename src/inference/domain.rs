//! Response shapes of the prediction endpoint.

use serde::{Deserialize, Serialize};

use crate::common::error::{ErrorCode, PredictError};
use crate::model::domain::Classification;

/// Successful prediction body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: u8,
    pub probability_class_0: f64,
    pub probability_class_1: f64,
}

impl From<Classification> for PredictionResult {
    fn from(c: Classification) -> Self {
        Self {
            prediction: c.label.as_u8(),
            probability_class_0: c.probabilities.class_0,
            probability_class_1: c.probabilities.class_1,
        }
    }
}

/// Error body: `{"error": "<message>"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl From<&PredictError> for ErrorResult {
    fn from(err: &PredictError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Final outcome of one prediction call, ready for the transport layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(PredictionResult),
    Failure { code: ErrorCode, body: ErrorResult },
}

impl Outcome {
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Success(_) => ErrorCode::Ok.http_status(),
            Outcome::Failure { code, .. } => code.http_status(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Outcome::Success(_) => ErrorCode::Ok,
            Outcome::Failure { code, .. } => *code,
        }
    }
}

impl From<PredictError> for Outcome {
    fn from(err: PredictError) -> Self {
        Outcome::Failure {
            code: err.code(),
            body: ErrorResult::from(&err),
        }
    }
}
