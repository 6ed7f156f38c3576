//! Filesystem loading of the predictor artefact and the process-wide model
//! state built from it.
//!
//! TODO: Check the artefact against a published SHA-256 before accepting it.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use super::domain::Predictor;
use super::naive_bayes::GaussianNb;

/// Outcome of the single startup load. Requests only ever read it.
#[derive(Clone)]
pub enum ModelState {
    Ready(Arc<dyn Predictor>),
    Unavailable { reason: String },
}

impl ModelState {
    pub fn ready<P: Predictor + 'static>(predictor: P) -> Self {
        ModelState::Ready(Arc::new(predictor))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelState::Unavailable {
            reason: reason.into(),
        }
    }

    /// Load the Gaussian NB artefact at `path`. A failure is logged and turned
    /// into `Unavailable`; it never aborts startup.
    pub fn load(path: &Path) -> Self {
        match GaussianNb::from_file(path) {
            Ok(model) => {
                info!(
                    path = %path.display(),
                    model_id = model.model_id(),
                    model_version = model.model_version(),
                    "model loaded successfully"
                );
                ModelState::ready(model)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "error loading model");
                ModelState::unavailable(err.to_string())
            }
        }
    }

    pub fn predictor(&self) -> Option<&Arc<dyn Predictor>> {
        match self {
            ModelState::Ready(predictor) => Some(predictor),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

impl std::fmt::Debug for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelState::Ready(_) => f.write_str("ModelState::Ready"),
            ModelState::Unavailable { reason } => {
                write!(f, "ModelState::Unavailable({reason})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::naive_bayes::tests::shifted_artifact;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "credit-risk-model-{tag}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ))
    }

    #[test]
    fn missing_file_is_unavailable() {
        let state = ModelState::load(&temp_path("absent"));
        assert!(!state.is_ready());
        match state {
            ModelState::Unavailable { reason } => assert!(reason.contains("could not be read")),
            ModelState::Ready(_) => panic!("absent file loaded"),
        }
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"\x00\x01 not a model").expect("write corrupt file");
        let state = ModelState::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(state.predictor().is_none());
    }

    #[test]
    fn valid_file_is_ready() {
        let path = temp_path("valid");
        let json = serde_json::to_vec(&shifted_artifact()).expect("serialise");
        std::fs::write(&path, json).expect("write model");
        let state = ModelState::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(state.is_ready());
    }

    #[test]
    fn bundled_sample_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/naive_bayes_model.json");
        GaussianNb::from_file(&path).expect("sample model is valid");
    }
}
