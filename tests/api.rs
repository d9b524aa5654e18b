//! Integration tests for the HTTP API.
//!
//! Every test runs the router in stub mode (no credential configured), so
//! the suite never touches the network: explanations come from the
//! deterministic local stub, and the degraded-but-present contract of the
//! explain endpoint can be asserted end-to-end. The fetch-url happy path
//! needs a live upstream and is not exercised here; its validation and
//! method handling are.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use readpaper::{router, AppState, ExplainConfig, STUB_LABEL};
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Test helpers ─────────────────────────────────────────────────────────

/// Router with a stub-mode (keyless) config.
fn stub_app() -> Router {
    let config = ExplainConfig::builder()
        .build()
        .expect("default config must build");
    let state = AppState::new(config).expect("state must build");
    router(state)
}

/// Issue one request and return status plus parsed JSON body.
async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .oneshot(builder.body(body).expect("valid request"))
        .await
        .expect("router must respond");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn explanations(body: &Value) -> Vec<String> {
    body["explanations"]
        .as_array()
        .expect("explanations array")
        .iter()
        .map(|v| v.as_str().expect("string explanation").to_string())
        .collect()
}

// ── Health ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_config_snapshot() {
    let (status, body) = send(stub_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["keyLoaded"], json!(false));
    assert_eq!(body["model"], json!("gpt-5"));
}

#[tokio::test]
async fn health_is_served_under_api_prefix_too() {
    let (status, body) = send(stub_app(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

// ── Explain batch: happy paths (stub mode) ───────────────────────────────

#[tokio::test]
async fn explain_whole_chunk_returns_one_explanation_per_line() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({ "chunkLines": ["First sentence.", "Second sentence."] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let got = explanations(&body);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], format!("{STUB_LABEL}First sentence."));
    assert_eq!(got[1], format!("{STUB_LABEL}Second sentence."));
}

#[tokio::test]
async fn explain_sub_range_is_index_aligned() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["a", "b", "c", "d", "e"],
            "startIndex": 2,
            "endIndex": 3
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let got = explanations(&body);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], format!("{STUB_LABEL}c"));
    assert_eq!(got[1], format!("{STUB_LABEL}d"));
}

#[tokio::test]
async fn stub_truncates_long_source_lines_to_180_chars() {
    let long = "z".repeat(400);
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({ "chunkLines": [long] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let got = explanations(&body);
    assert_eq!(
        got[0].chars().count(),
        STUB_LABEL.chars().count() + 180
    );
}

#[tokio::test]
async fn custom_delimiter_round_trips_through_stub_mode() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["one", "two", "three"],
            "delimiter": "@@"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let got = explanations(&body);
    assert_eq!(got.len(), 3);
    for e in &got {
        assert!(e.starts_with(STUB_LABEL), "got: {e}");
        assert!(!e.trim().is_empty());
    }
}

#[tokio::test]
async fn wrongly_typed_indices_fall_back_to_full_range() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["a", "b", "c"],
            "startIndex": "not a number",
            "endIndex": null
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(explanations(&body).len(), 3);
}

// ── Explain batch: validation (no remote call is ever attempted; stub
//    mode would make one impossible anyway, and these fail before it) ─────

#[tokio::test]
async fn missing_chunk_lines_is_rejected() {
    let (status, body) = send(stub_app(), "POST", "/api/explain-batch", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("chunk_lines_required"));
}

#[tokio::test]
async fn empty_chunk_lines_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({ "chunkLines": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("chunk_lines_required"));
}

#[tokio::test]
async fn non_array_chunk_lines_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({ "chunkLines": "a\nb" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("chunk_lines_required"));
}

#[tokio::test]
async fn missing_body_is_rejected_like_empty_object() {
    let (status, body) = send(stub_app(), "POST", "/api/explain-batch", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("chunk_lines_required"));
}

#[tokio::test]
async fn start_after_end_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["a", "b", "c"],
            "startIndex": 2,
            "endIndex": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_range"));
}

#[tokio::test]
async fn end_past_chunk_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["a", "b"],
            "endIndex": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_range"));
}

#[tokio::test]
async fn negative_start_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/explain-batch",
        Some(json!({
            "chunkLines": ["a", "b"],
            "startIndex": -1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_range"));
}

// ── Method handling ──────────────────────────────────────────────────────

#[tokio::test]
async fn get_on_explain_batch_is_method_not_allowed() {
    let (status, body) = send(stub_app(), "GET", "/api/explain-batch", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], json!("method_not_allowed"));
}

#[tokio::test]
async fn get_on_fetch_url_is_method_not_allowed() {
    let (status, body) = send(stub_app(), "GET", "/api/fetch-url", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], json!("method_not_allowed"));
}

// ── Fetch URL: validation ────────────────────────────────────────────────

#[tokio::test]
async fn fetch_url_without_url_is_rejected() {
    let (status, body) = send(stub_app(), "POST", "/api/fetch-url", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("url_required"));
}

#[tokio::test]
async fn fetch_url_with_empty_url_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/fetch-url",
        Some(json!({ "url": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("url_required"));
}

#[tokio::test]
async fn fetch_url_with_non_string_url_is_rejected() {
    let (status, body) = send(
        stub_app(),
        "POST",
        "/api/fetch-url",
        Some(json!({ "url": 12345 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("url_required"));
}

// ── Unknown routes ───────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = send(stub_app(), "GET", "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
