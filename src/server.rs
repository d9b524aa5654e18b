//! HTTP surface: axum router, wire types, and error envelope.
//!
//! Three endpoints, all JSON:
//!
//! * `POST /api/explain-batch` — explain a line range of a chunk
//! * `POST /api/fetch-url`     — fetch a page and split it into rough lines
//! * `GET  /health` / `GET /api/health` — liveness plus config snapshot
//!
//! Each request is handled independently and statelessly; the shared
//! [`AppState`] holds only the immutable config snapshot and the pooled
//! HTTP client. Errors cross the wire as `{ "error": "<stable_code>" }`
//! envelopes so clients can branch without parsing prose.
//!
//! Wire leniency: browser clients send `startIndex`/`endIndex` of whatever
//! type they have on hand. Fields that are absent or wrongly typed
//! deserialize to `None` (and pick up their documented defaults) instead of
//! rejecting the request; only range and emptiness violations reject.

use crate::batch::ExplanationRequest;
use crate::config::ExplainConfig;
use crate::error::ExplainError;
use crate::explain;
use crate::pipeline::extract;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// User-Agent sent on every outbound request.
const USER_AGENT: &str = "readpaper/1.0";

/// Shared per-process state: the config snapshot and the pooled client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ExplainConfig>,
    pub client: reqwest::Client,
}

impl AppState {
    /// Build the state, constructing the shared HTTP client once.
    pub fn new(config: ExplainConfig) -> Result<Self, ExplainError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExplainError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/explain-batch",
            post(explain_batch).fallback(method_not_allowed),
        )
        .route(
            "/api/fetch-url",
            post(fetch_url).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ExplainError> {
    let model = state.config.model.clone();
    let key_loaded = state.config.key_loaded();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ExplainError::Internal(format!("failed to bind {addr}: {e}")))?;

    info!("listening on http://{addr}");
    info!("model: {model}, keyLoaded: {key_loaded}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ExplainError::Internal(format!("server error: {e}")))
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExplainBatchBody {
    #[serde(deserialize_with = "lenient_string_array")]
    pub chunk_lines: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_integer")]
    pub start_index: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub end_index: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub delimiter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FetchUrlBody {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

#[derive(Serialize)]
struct ExplainBatchResponse {
    explanations: Vec<String>,
}

#[derive(Serialize)]
struct FetchUrlResponse {
    lines: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    key_loaded: bool,
    model: String,
}

/// Accept any JSON value; yield `Some` only for an array of strings.
fn lenient_string_array<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(items) = value.as_array() else {
        return Ok(None);
    };
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => lines.push(s.to_string()),
            None => return Ok(None),
        }
    }
    Ok(Some(lines))
}

/// Accept any JSON value; yield `Some` only for an integer.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

/// Accept any JSON value; yield `Some` only for a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_string))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        key_loaded: state.config.key_loaded(),
        model: state.config.model.clone(),
    })
}

async fn explain_batch(
    State(state): State<AppState>,
    body: Option<Json<ExplainBatchBody>>,
) -> Response {
    // A missing or non-JSON body is treated as an empty object, so it fails
    // the same chunk-lines validation as `{}`.
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let request = match ExplanationRequest::new(
        body.chunk_lines.unwrap_or_default(),
        body.start_index,
        body.end_index,
        body.delimiter,
    ) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    let outcome = explain::explain_batch(&state.client, &state.config, &request).await;
    Json(ExplainBatchResponse {
        explanations: outcome.explanations,
    })
    .into_response()
}

async fn fetch_url(State(state): State<AppState>, body: Option<Json<FetchUrlBody>>) -> Response {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let Some(url) = body.url.filter(|u| !u.is_empty()) else {
        return error_response(&ExplainError::UrlRequired);
    };

    match fetch_lines(&state, &url).await {
        Ok(lines) => Json(FetchUrlResponse { lines }).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn fetch_lines(state: &AppState, url: &str) -> Result<Vec<String>, ExplainError> {
    let response = state
        .client
        .get(url)
        .timeout(Duration::from_secs(state.config.fetch_timeout_secs))
        .send()
        .await
        .map_err(|e| ExplainError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExplainError::UpstreamStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response.text().await.map_err(|e| ExplainError::FetchFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(extract::lines_from_html(&html))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method_not_allowed" })),
    )
        .into_response()
}

// ── Error mapping ────────────────────────────────────────────────────────

/// Map an [`ExplainError`] to its HTTP status and JSON envelope.
fn error_response(e: &ExplainError) -> Response {
    let status = match e {
        ExplainError::EmptyChunk
        | ExplainError::InvalidRange { .. }
        | ExplainError::UrlRequired
        | ExplainError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        ExplainError::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
        ExplainError::FetchFailed { .. } | ExplainError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("request failed: {e}");
    }

    let mut envelope = json!({ "error": e.code() });
    if let ExplainError::UpstreamStatus {
        status: upstream, ..
    } = e
    {
        envelope["status"] = json!(upstream);
    }

    (status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_parses_well_formed_request() {
        let body: ExplainBatchBody = serde_json::from_value(json!({
            "chunkLines": ["a", "b"],
            "startIndex": 0,
            "endIndex": 1,
            "delimiter": "|"
        }))
        .unwrap();
        assert_eq!(body.chunk_lines, Some(vec!["a".into(), "b".into()]));
        assert_eq!(body.start_index, Some(0));
        assert_eq!(body.end_index, Some(1));
        assert_eq!(body.delimiter, Some("|".into()));
    }

    #[test]
    fn wrongly_typed_indices_default_to_none() {
        let body: ExplainBatchBody = serde_json::from_value(json!({
            "chunkLines": ["a"],
            "startIndex": "zero",
            "endIndex": 1.5
        }))
        .unwrap();
        assert_eq!(body.start_index, None);
        assert_eq!(body.end_index, None);
    }

    #[test]
    fn non_array_chunk_lines_is_none() {
        let body: ExplainBatchBody =
            serde_json::from_value(json!({ "chunkLines": "not an array" })).unwrap();
        assert_eq!(body.chunk_lines, None);
    }

    #[test]
    fn array_with_non_string_element_is_none() {
        let body: ExplainBatchBody =
            serde_json::from_value(json!({ "chunkLines": ["a", 42] })).unwrap();
        assert_eq!(body.chunk_lines, None);
    }

    #[test]
    fn absent_fields_default_to_none() {
        let body: ExplainBatchBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.chunk_lines, None);
        assert_eq!(body.start_index, None);
        assert_eq!(body.end_index, None);
        assert_eq!(body.delimiter, None);
    }

    #[test]
    fn non_string_url_is_none() {
        let body: FetchUrlBody = serde_json::from_value(json!({ "url": 7 })).unwrap();
        assert_eq!(body.url, None);
    }
}
