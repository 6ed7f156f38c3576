//! Predictor capability, the Gaussian NB implementation and artefact loading.

pub mod domain;
pub mod naive_bayes;
pub mod repo_fs;

pub use domain::{ClassLabel, ClassProbabilities, Classification, Predictor, PredictorError};
pub use naive_bayes::GaussianNb;
pub use repo_fs::ModelState;
