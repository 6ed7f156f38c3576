//! Prediction orchestration: body parsing, normalisation, predictor call and
//! mapping of every failure onto the response taxonomy.
//!
//! TODO: Move the predictor call onto `spawn_blocking` if a predictor heavier
//!       than Gaussian NB is ever plugged in.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::common::error::{PredictError, PredictResult};
use crate::common::log::render;
use crate::features::domain::{FeatureSchema, RawInput};
use crate::features::service::{json_type, normalize};
use crate::metrics::MetricsSink;
use crate::model::domain::PredictorError;
use crate::model::repo_fs::ModelState;

use super::domain::{Outcome, PredictionResult};

/// Decode a request body into a raw feature mapping.
pub fn parse_body(body: &[u8]) -> PredictResult<RawInput> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| PredictError::MalformedBody(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PredictError::MalformedBody(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

impl From<PredictorError> for PredictError {
    fn from(err: PredictorError) -> Self {
        match err {
            PredictorError::InvalidInput(msg) => PredictError::InvalidFeatureValue(msg),
            PredictorError::Internal(msg) => PredictError::UnexpectedFailure(msg),
        }
    }
}

/// Response composer with the predictor injected at construction.
#[derive(Clone)]
pub struct InferenceService {
    model: ModelState,
    schema: FeatureSchema,
    metrics: Arc<dyn MetricsSink>,
}

impl InferenceService {
    pub fn new(model: ModelState, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            model,
            schema: FeatureSchema::credit_risk(),
            metrics,
        }
    }

    /// Run a prediction over an already decoded input. No logging or metrics.
    pub fn predict(&self, raw: &RawInput) -> PredictResult<PredictionResult> {
        let predictor = self.model.predictor().ok_or(PredictError::ModelNotLoaded)?;
        let features = normalize(raw, &self.schema)?;
        debug!(features = ?features.as_slice(), "processed features for prediction");

        let classified = panic::catch_unwind(AssertUnwindSafe(|| predictor.classify(&features)))
            .map_err(|payload| PredictError::UnexpectedFailure(panic_message(payload.as_ref())))?;
        Ok(PredictionResult::from(classified?))
    }

    /// Full request handling for a raw body: always yields an outcome, logs the
    /// input and the result, and records the outcome metric.
    pub fn handle(&self, body: &[u8]) -> Outcome {
        self.finish(self.run(body))
    }

    /// Handling for a body the transport could not read (too large, aborted).
    /// An unloaded model still takes precedence.
    pub fn handle_unreadable(&self, detail: &str) -> Outcome {
        let result = self.ensure_model().and_then(|_| {
            info!(detail, "received unreadable request body");
            Err(PredictError::MalformedBody(detail.to_string()))
        });
        self.finish(result)
    }

    fn finish(&self, result: PredictResult<PredictionResult>) -> Outcome {
        match &result {
            Ok(output) => info!(output = %render(output), "prediction successful"),
            Err(err) => {
                let code = err.code() as u32;
                error!(code, error = %err, "prediction failed");
            }
        }
        let outcome_label = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome_label(),
        };
        self.metrics.record_prediction(outcome_label);

        match result {
            Ok(output) => Outcome::Success(output),
            Err(err) => Outcome::from(err),
        }
    }

    fn ensure_model(&self) -> PredictResult<()> {
        if self.model.is_ready() {
            Ok(())
        } else {
            error!("prediction requested but model is not loaded");
            Err(PredictError::ModelNotLoaded)
        }
    }

    fn run(&self, body: &[u8]) -> PredictResult<PredictionResult> {
        self.ensure_model()?;

        let raw = match parse_body(body) {
            Ok(raw) => raw,
            Err(err) => {
                info!(input = %String::from_utf8_lossy(body), "received undecodable input");
                return Err(err);
            }
        };
        info!(input = %render(&raw), "received raw input data");

        self.predict(&raw)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "predictor panicked".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::error::ErrorCode;
    use crate::features::domain::{FeatureVector, FEATURE_SCHEMA};
    use crate::inference::domain::ErrorResult;
    use crate::metrics::{NoopMetrics, RequestMetrics};
    use crate::model::domain::{ClassLabel, ClassProbabilities, Predictor};
    use crate::model::naive_bayes::{tests::shifted_artifact, GaussianNb};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    /// Predictor that fails in a fixed way.
    pub(crate) enum FailingPredictor {
        Invalid,
        Internal,
        Panics,
    }

    impl Predictor for FailingPredictor {
        fn predict(&self, _: &FeatureVector) -> Result<ClassLabel, PredictorError> {
            match self {
                FailingPredictor::Invalid => {
                    Err(PredictorError::InvalidInput("shape (1, 42)".to_string()))
                }
                FailingPredictor::Internal => {
                    Err(PredictorError::Internal("allocator exhausted".to_string()))
                }
                FailingPredictor::Panics => panic!("model blew up"),
            }
        }

        fn predict_probability(
            &self,
            features: &FeatureVector,
        ) -> Result<ClassProbabilities, PredictorError> {
            self.predict(features).map(|_| ClassProbabilities {
                class_0: 0.5,
                class_1: 0.5,
            })
        }
    }

    pub(crate) fn full_input(value: f64) -> RawInput {
        FEATURE_SCHEMA
            .iter()
            .map(|name| (name.to_string(), json!(value)))
            .collect()
    }

    pub(crate) fn gnb_state() -> ModelState {
        ModelState::ready(GaussianNb::from_artifact(shifted_artifact()).expect("valid artefact"))
    }

    fn service(model: ModelState) -> InferenceService {
        InferenceService::new(model, Arc::new(NoopMetrics))
    }

    fn body(raw: &RawInput) -> Vec<u8> {
        serde_json::to_vec(raw).expect("serialise")
    }

    fn failure_message(outcome: Outcome) -> (ErrorCode, String) {
        match outcome {
            Outcome::Failure {
                code,
                body: ErrorResult { error },
            } => (code, error),
            Outcome::Success(s) => panic!("expected failure, got {s:?}"),
        }
    }

    #[test]
    fn complete_input_succeeds_with_consistent_probabilities() {
        let svc = service(gnb_state());
        let outcome = svc.handle(&body(&full_input(0.9)));
        match outcome {
            Outcome::Success(result) => {
                assert_eq!(result.prediction, 1);
                assert_abs_diff_eq!(
                    result.probability_class_0 + result.probability_class_1,
                    1.0,
                    epsilon = 1e-9
                );
            }
            Outcome::Failure { body, .. } => panic!("unexpected failure {}", body.error),
        }
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let svc = service(gnb_state());
        let payload = body(&full_input(0.3));
        assert_eq!(svc.handle(&payload), svc.handle(&payload));
    }

    #[test]
    fn unloaded_model_fails_regardless_of_input() {
        let svc = service(ModelState::unavailable("file not found"));
        for payload in [body(&full_input(0.0)), b"{}".to_vec(), b"garbage".to_vec()] {
            let (code, msg) = failure_message(svc.handle(&payload));
            assert_eq!(code, ErrorCode::ModelMissing);
            assert_eq!(msg, "Internal server error: Model not loaded.");
        }
    }

    #[test]
    fn missing_feature_is_bad_request_naming_it() {
        let svc = service(gnb_state());
        let mut raw = full_input(0.0);
        raw.remove("LTV");
        let (code, msg) = failure_message(svc.handle(&body(&raw)));
        assert_eq!(code, ErrorCode::InvalidInput);
        assert!(msg.contains("Missing feature in input data: LTV"));
    }

    #[test]
    fn string_value_is_bad_request() {
        let svc = service(gnb_state());
        let mut raw = full_input(0.0);
        raw.insert("DTI".into(), json!("high"));
        let (code, msg) = failure_message(svc.handle(&body(&raw)));
        assert_eq!(code, ErrorCode::InvalidInput);
        assert!(msg.starts_with("Incorrect number or type of features provided."));
        assert!(msg.contains("'DTI'"));
    }

    #[test]
    fn malformed_bodies_are_bad_requests() {
        let svc = service(gnb_state());
        let payloads: [&[u8]; 3] = [b"{\"CreditScore\": ", b"[1, 2, 3]", b"42"];
        for payload in payloads {
            let (code, msg) = failure_message(svc.handle(payload));
            assert_eq!(code, ErrorCode::InvalidInput);
            assert!(msg.starts_with("Request body must be a JSON object"));
        }
    }

    #[test]
    fn predictor_errors_map_onto_the_taxonomy() {
        let invalid = service(ModelState::ready(FailingPredictor::Invalid));
        let (code, msg) = failure_message(invalid.handle(&body(&full_input(0.0))));
        assert_eq!(code, ErrorCode::InvalidInput);
        assert!(msg.contains("shape (1, 42)"));

        let internal = service(ModelState::ready(FailingPredictor::Internal));
        let (code, msg) = failure_message(internal.handle(&body(&full_input(0.0))));
        assert_eq!(code, ErrorCode::Internal);
        assert_eq!(msg, "An unexpected error occurred: allocator exhausted");
    }

    #[test]
    fn predictor_panic_becomes_internal_error() {
        let svc = service(ModelState::ready(FailingPredictor::Panics));
        let (code, msg) = failure_message(svc.handle(&body(&full_input(0.0))));
        assert_eq!(code, ErrorCode::Internal);
        assert!(msg.contains("model blew up"));
    }

    #[test]
    fn unreadable_body_is_bad_request_unless_model_missing() {
        let svc = service(gnb_state());
        let (code, msg) = failure_message(svc.handle_unreadable("length limit exceeded"));
        assert_eq!(code, ErrorCode::InvalidInput);
        assert!(msg.contains("length limit exceeded"));

        let svc = service(ModelState::unavailable("no artefact"));
        let (code, _) = failure_message(svc.handle_unreadable("length limit exceeded"));
        assert_eq!(code, ErrorCode::ModelMissing);
    }

    #[test]
    fn extreme_values_are_bad_requests() {
        let svc = service(gnb_state());
        let (code, msg) = failure_message(svc.handle(&body(&full_input(1e200))));
        assert_eq!(code, ErrorCode::InvalidInput);
        assert!(msg.starts_with("Incorrect number or type of features provided."));
    }

    #[test]
    fn outcomes_are_recorded() {
        let metrics = Arc::new(RequestMetrics::new());
        let svc = InferenceService::new(gnb_state(), metrics.clone());
        svc.handle(&body(&full_input(0.0)));
        svc.handle(b"{}");
        svc.handle(b"not json");

        assert_eq!(metrics.prediction_count("success"), 1);
        assert_eq!(metrics.prediction_count("missing_feature"), 1);
        assert_eq!(metrics.prediction_count("malformed_body"), 1);
    }
}
