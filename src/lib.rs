// lib.rs - credit-risk prediction service
pub mod api;
pub mod common;
pub mod features;
pub mod inference;
pub mod metrics;
pub mod model;

pub use api::http::{router, AppState};
pub use inference::service::InferenceService;
pub use model::repo_fs::ModelState;
