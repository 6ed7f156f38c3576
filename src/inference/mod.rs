//! Prediction pipeline: normalise, classify, compose the response.

pub mod domain;
pub mod service;

pub use domain::{ErrorResult, Outcome, PredictionResult};
pub use service::InferenceService;
