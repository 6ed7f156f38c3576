//! HTTP surface: welcome text, the HTML form, the prediction endpoint and the
//! metrics exposition.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::inference::domain::Outcome;
use crate::inference::service::InferenceService;
use crate::metrics::{MetricsSink, RequestMetrics};
use crate::model::repo_fs::ModelState;

pub const WELCOME_MESSAGE: &str =
    "Welcome to the Credit Risk Category Prediction API! Navigate to /app for the web interface.";

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: InferenceService,
    pub metrics: Arc<RequestMetrics>,
}

impl AppState {
    pub fn new(model: ModelState) -> Self {
        let metrics = Arc::new(RequestMetrics::new());
        let service = InferenceService::new(model, metrics.clone());
        Self { service, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/app", get(web_app))
        .route("/predict", post(predict))
        // everything above is counted; /metrics below is not
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn home() -> &'static str {
    WELCOME_MESSAGE
}

async fn web_app() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// The body is decoded by the service whatever the content type says. A body
/// the transport refuses (over the default size limit) still gets a JSON error.
async fn predict(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let outcome = match body {
        Ok(body) => state.service.handle(&body),
        Err(rejection) => state.service.handle_unreadable(&rejection.body_text()),
    };
    match outcome {
        Outcome::Success(result) => (StatusCode::OK, Json(result)).into_response(),
        Outcome::Failure { code, body } => {
            let status = StatusCode::from_u16(code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(body)).into_response()
        }
    }
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    state.metrics.record_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed(),
    );
    response
}
