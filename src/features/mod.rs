//! Feature schema and input normalisation.

pub mod domain;
pub mod service;

pub use domain::{FeatureSchema, FeatureVector, RawInput, FEATURE_COUNT, FEATURE_SCHEMA};
pub use service::normalize;
