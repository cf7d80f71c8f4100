//! Route-level tests against the demo artifact

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use interest_dashboard::{build_router, AppState};
use interest_predictor::Predictor;
use serde_json::{json, Value};
use tower::ServiceExt;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(name)
}

fn app_with_samples(samples: Option<PathBuf>) -> Router {
    let predictor = Predictor::load_model(data_path("model.json")).expect("demo model loads");
    build_router(Arc::new(AppState::new(predictor).with_sample_path(samples)))
}

fn app() -> Router {
    app_with_samples(None)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn api_predict_returns_distribution() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"age": 25, "gender": "male"}))).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["label"], "Action");
    assert_eq!(value["probabilities"]["Action"], 0.8);
    assert_eq!(value["probabilities"]["Animation"], 0.1);
    assert_eq!(value["probabilities"]["Drama"], 0.1);
}

#[tokio::test]
async fn api_predict_accepts_gender_codes() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"age": 19, "gender": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["label"], "Animation");
}

#[tokio::test]
async fn api_predict_rejects_out_of_range_age() {
    let (status, body) = send(app(), post_json("/api/predict", json!({"age": 81, "gender": 1}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("81"));
}

#[tokio::test]
async fn api_predict_rejects_unknown_gender_code() {
    let (status, _) = send(app(), post_json("/api/predict", json!({"age": 30, "gender": 2}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn index_renders_form() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"action="/predict""#));
    assert!(body.contains(r#"value="25""#));
    assert!(body.contains(r#"value="female" checked"#));
}

#[tokio::test]
async fn form_predict_renders_result_card() {
    let (status, body) = send(app(), post_form("/predict", "age=25&gender=male")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<p class="label">Action</p>"#));
    assert!(body.contains("Confidence: 80.0%"));
}

#[tokio::test]
async fn form_predict_with_bad_age_reports_validation_message() {
    let (status, body) = send(app(), post_form("/predict", "age=abc&gender=female")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("not a whole number"));
    assert!(body.contains(r#"action="/predict""#));
}

#[tokio::test]
async fn api_batch_keeps_order_and_isolates_failures() {
    let request = post_json(
        "/api/predict/batch",
        json!({"rows": [
            {"age": 19, "gender": "female"},
            {"age": 25, "gender": "male"},
            {"age": 42},
            {"age": 30, "gender": 0},
            {"age": 99, "gender": 1}
        ]}),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["stats"]["total"], 5);
    assert_eq!(value["stats"]["failed"], 2);

    let rows = value["rows"].as_array().unwrap();
    let numbers: Vec<u64> = rows.iter().map(|r| r["row"].as_u64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    assert_eq!(rows[1]["prediction"]["label"], "Action");
    assert!(rows[2]["error"].as_str().unwrap().contains("missing gender"));
    assert!(rows[2].get("prediction").is_none());
    assert!(rows[4]["error"].as_str().unwrap().starts_with("row 5"));
}

#[tokio::test]
async fn api_batch_wrong_typed_row_does_not_sink_the_request() {
    let request = post_json(
        "/api/predict/batch",
        json!({"rows": [
            {"age": 25, "gender": 1},
            {"age": "abc", "gender": 1},
            {"age": 30, "gender": 0},
            {"age": 25.5, "gender": true}
        ]}),
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["stats"]["total"], 4);
    assert_eq!(value["stats"]["succeeded"], 2);

    let rows = value["rows"].as_array().unwrap();
    assert_eq!(rows[0]["prediction"]["label"], "Action");
    assert!(rows[1]["error"].as_str().unwrap().starts_with("row 2: malformed row"));
    assert_eq!(rows[2]["prediction"]["label"], "Drama");
    assert!(rows[3]["error"].as_str().unwrap().starts_with("row 4"));
}

#[tokio::test]
async fn api_batch_without_rows_is_a_json_error() {
    let (status, body) = send(app(), post_json("/api/predict/batch", json!({"items": []}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("rows"));
}

#[tokio::test]
async fn api_predict_body_errors_use_error_shape() {
    for body in [
        json!({"age": 25}),
        json!({"age": 25.0, "gender": 1}),
        json!({"age": "25", "gender": 1}),
    ] {
        let (status, text) = send(app(), post_json("/api/predict", body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value["error"].is_string(), "{body}: {text}");
    }

    let (status, text) = send(app(), post_json("/api/predict", json!({"age": 25}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(text.contains("gender"));
}

#[tokio::test]
async fn api_predict_rejects_unparseable_json_with_error_shape() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, text) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: Value = serde_json::from_str(&text).unwrap();
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn batch_page_without_samples_is_not_found() {
    let (status, body) = send(app(), get("/batch")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No sample file"));
}

#[tokio::test]
async fn batch_page_renders_sample_table() {
    let app = app_with_samples(Some(data_path("sample.csv")));
    let (status, body) = send(app, get("/batch")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("10 rows, 9 predicted, 1 failed"));
    assert!(body.contains("missing gender value"));
}

#[tokio::test]
async fn api_model_returns_summary() {
    let (status, body) = send(app(), get("/api/model")).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["depth"], 3);
    assert_eq!(value["leaf_count"], 4);
    assert_eq!(value["feature_importances"][0]["feature"], "age");
    assert_eq!(value["fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn model_page_shows_tree_diagram() {
    let (status, body) = send(app(), get("/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("|--- age &lt;= 22.50"));
    assert!(body.contains("Depth 3, 4 leaves, 7 nodes"));
}

#[tokio::test]
async fn health_reports_fingerprint() {
    let (status, body) = send(app(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["service"], "interest-dashboard");
    assert_eq!(value["model_fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn metrics_route_is_absent_when_exporter_disabled() {
    let (status, body) = send(app(), get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("disabled"));
}
