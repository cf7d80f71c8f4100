use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use interest_predictor::{
    BatchRowView, BatchStats, FeatureVector, Gender, ModelSummary, PredictionResult, Predictor,
    PredictorError, SampleDataset, SampleRow,
};
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::render::{self, FormValues};
use crate::telemetry::{BATCH_ROWS_TOTAL, PREDICTIONS_TOTAL, PREDICTION_FAILURES_TOTAL};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub sample_path: Option<PathBuf>,
    pub start_time: Instant,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            sample_path: None,
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_sample_path(mut self, path: Option<PathBuf>) -> Self {
        self.sample_path = path;
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Predict and record the outcome in the metrics registry
    fn predict(&self, input: &FeatureVector) -> Result<PredictionResult, PredictorError> {
        match self.predictor.predict(input) {
            Ok(result) => {
                counter!(PREDICTIONS_TOTAL, "label" => result.label.as_str()).increment(1);
                Ok(result)
            }
            Err(err) => {
                counter!(PREDICTION_FAILURES_TOTAL).increment(1);
                Err(err)
            }
        }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<PredictorError> for ApiError {
    fn from(err: PredictorError) -> Self {
        let status = match &err {
            PredictorError::InvalidInput(_) | PredictorError::BatchRow { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PredictorError::Dataset(_) => StatusCode::BAD_REQUEST,
            PredictorError::ArtifactNotFound { .. }
            | PredictorError::ArtifactCorrupt { .. }
            | PredictorError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(Arc::new(state));
    let listener = bind_listener(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .await
        .context("Dashboard server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind dashboard listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind dashboard listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/predict", post(handle_predict_form))
        .route("/batch", get(handle_batch_page))
        .route("/model", get(handle_model_page))
        .route("/api/predict", post(handle_api_predict))
        .route("/api/predict/batch", post(handle_api_batch))
        .route("/api/model", get(handle_api_model))
        .route("/api/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index() -> Html<String> {
    Html(render::index_page(&FormValues::default(), None))
}

#[derive(Debug, Deserialize)]
struct PredictForm {
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

async fn handle_predict_form(
    State(state): State<SharedState>,
    Form(form): Form<PredictForm>,
) -> Response {
    let values = FormValues {
        age: form.age.unwrap_or_default(),
        gender: form.gender.unwrap_or_default(),
    };

    let outcome = FeatureVector::parse(&values.age, &values.gender)
        .and_then(|input| state.predict(&input));
    match outcome {
        Ok(result) => Html(render::result_page(&values, &result)).into_response(),
        Err(err) => {
            let (status, message) = match &err {
                PredictorError::InvalidInput(reason) => {
                    warn!("Rejected form input: {}", reason);
                    (StatusCode::UNPROCESSABLE_ENTITY, reason.clone())
                }
                other => {
                    warn!("Prediction failed: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
                }
            };
            (status, Html(render::index_page(&values, Some(&message)))).into_response()
        }
    }
}

async fn handle_batch_page(State(state): State<SharedState>) -> Response {
    let Some(path) = state.sample_path.as_ref() else {
        return (
            StatusCode::NOT_FOUND,
            Html(render::message_page(
                "No sample file",
                "No sample file is configured; set sample_path or pass --samples.",
            )),
        )
            .into_response();
    };

    match SampleDataset::from_csv(path) {
        Ok(dataset) => {
            let report = state.predictor.predict_samples(&dataset);
            counter!(BATCH_ROWS_TOTAL).increment(report.len() as u64);
            Html(render::batch_page(&path.display().to_string(), &report)).into_response()
        }
        Err(err) => {
            warn!("Sample file unusable: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::message_page("Sample file unusable", &err.to_string())),
            )
                .into_response()
        }
    }
}

async fn handle_model_page(State(state): State<SharedState>) -> Html<String> {
    let summary = state.predictor.summary();
    let tree = state.predictor.render_tree();
    Html(render::model_page(&summary, &tree))
}

/// Gender as a code (`0`/`1`) or a name
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum GenderField {
    Code(i64),
    Name(String),
}

impl GenderField {
    fn resolve(&self) -> Result<Gender, PredictorError> {
        match self {
            GenderField::Code(code) => Gender::from_code(*code),
            GenderField::Name(name) => name.parse(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    age: i64,
    gender: GenderField,
}

async fn handle_api_predict(
    State(state): State<SharedState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = payload?;
    let gender = request.gender.resolve()?;
    let input = FeatureVector::new(request.age, gender)?;
    Ok(Json(state.predict(&input)?))
}

#[derive(Debug, Deserialize)]
struct BatchRequestRow {
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    gender: Option<GenderField>,
}

impl BatchRequestRow {
    /// Decode one raw row; a wrong-typed field fails this row only.
    fn decode(raw: Value) -> Result<FeatureVector, PredictorError> {
        let row: BatchRequestRow = serde_json::from_value(raw)
            .map_err(|err| PredictorError::InvalidInput(format!("malformed row: {err}")))?;
        row.to_input()
    }

    fn to_input(&self) -> Result<FeatureVector, PredictorError> {
        let age = self
            .age
            .ok_or_else(|| PredictorError::InvalidInput("missing age value".into()))?;
        let gender = self
            .gender
            .as_ref()
            .ok_or_else(|| PredictorError::InvalidInput("missing gender value".into()))?
            .resolve()?;
        FeatureVector::new(age, gender)
    }
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    rows: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    stats: BatchStats,
    rows: Vec<BatchRowView>,
}

async fn handle_api_batch(
    State(state): State<SharedState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload?;
    let dataset = SampleDataset {
        rows: request
            .rows
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| SampleRow {
                row: idx + 1,
                input: BatchRequestRow::decode(raw),
                expected: None,
            })
            .collect(),
    };

    let report = state.predictor.predict_samples(&dataset);
    counter!(BATCH_ROWS_TOTAL).increment(report.len() as u64);
    Ok(Json(BatchResponse {
        stats: report.stats(),
        rows: report.views(),
    }))
}

async fn handle_api_model(State(state): State<SharedState>) -> Json<ModelSummary> {
    Json(state.predictor.summary())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    model_fingerprint: String,
    uptime_secs: u64,
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "interest-dashboard",
        version: env!("CARGO_PKG_VERSION"),
        model_fingerprint: state.predictor.fingerprint().to_string(),
        uptime_secs: state.uptime_seconds(),
    })
}

async fn handle_metrics(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::not_found("metrics exporter disabled"))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifier_faults_are_server_errors() {
        let err = ApiError::from(PredictorError::Classifier("no usable leaf".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(PredictorError::InvalidInput("age 81 is outside 18..=80".into()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn wrong_typed_row_fields_fail_that_row() {
        for raw in [
            json!({"age": "abc", "gender": 1}),
            json!({"age": 25.5, "gender": 1}),
            json!({"age": 25, "gender": true}),
            json!([25, 1]),
        ] {
            assert!(matches!(
                BatchRequestRow::decode(raw),
                Err(PredictorError::InvalidInput(_))
            ));
        }
        let input = BatchRequestRow::decode(json!({"age": 25, "gender": "m"})).unwrap();
        assert_eq!(input.gender, Gender::Male);
    }
}
