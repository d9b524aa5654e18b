//! Model invocation: drive the backend through ordered call shapes.
//!
//! The backend exposes two request shapes for the same model; which one a
//! given deployment accepts varies. Rather than branching ad hoc, the
//! adapter walks an ordered list of [`InvocationStrategy`] objects — the
//! first *structurally* successful attempt wins, even if the text it
//! produced is empty. The prompt is never altered between attempts, and no
//! strategy is tried more than once.
//!
//! The adapter itself never fails. Three situations route to the
//! deterministic local stub instead:
//!
//! * no credential is configured (no network call is attempted at all),
//! * every strategy failed structurally,
//! * the winning attempt produced empty or whitespace-only text.
//!
//! Per-attempt failures are logged at `warn` and absorbed; callers of
//! [`produce_raw_text`] always get a [`RawResponse`] back.

use crate::batch::{ExplanationRequest, ResponseOrigin};
use crate::config::ExplainConfig;
use crate::error::InvocationError;
use crate::prompts::{stub_explanation, PromptPair};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Raw text produced by some invocation path, plus where it came from.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub text: String,
    pub origin: ResponseOrigin,
}

/// One way of asking the backend to produce raw text for a prompt pair.
#[async_trait]
pub trait InvocationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn origin(&self) -> ResponseOrigin;

    /// Attempt the call. `Ok` means the attempt succeeded structurally —
    /// the returned text may still be empty.
    async fn invoke(
        &self,
        client: &reqwest::Client,
        config: &ExplainConfig,
        api_key: &str,
        prompt: &PromptPair,
    ) -> Result<String, InvocationError>;
}

/// The ordered fallback chain: primary shape first, then the secondary.
fn strategies() -> [&'static dyn InvocationStrategy; 2] {
    [&ResponsesApi, &ChatCompletionsApi]
}

/// Produce raw text for the request, falling back to the stub as needed.
///
/// This is the only function in the crate with model-backend network I/O,
/// and it never returns an error.
pub async fn produce_raw_text(
    client: &reqwest::Client,
    config: &ExplainConfig,
    prompt: &PromptPair,
    request: &ExplanationRequest,
) -> RawResponse {
    let Some(api_key) = config.api_key.as_deref() else {
        debug!("no credential configured, using local stub");
        return stub_response(request);
    };

    let mut raw: Option<RawResponse> = None;
    for strategy in strategies() {
        match strategy.invoke(client, config, api_key, prompt).await {
            Ok(text) => {
                debug!(
                    "{} succeeded: {} chars of raw text",
                    strategy.name(),
                    text.len()
                );
                raw = Some(RawResponse {
                    text,
                    origin: strategy.origin(),
                });
                break;
            }
            Err(e) => {
                warn!("{} failed — {}", strategy.name(), e);
            }
        }
    }

    match raw {
        Some(response) if !response.text.trim().is_empty() => response,
        Some(_) => {
            warn!("model returned empty text, using local stub");
            stub_response(request)
        }
        None => {
            warn!("all invocation strategies failed, using local stub");
            stub_response(request)
        }
    }
}

/// Deterministic, network-free explanations for the requested range.
///
/// One stub line per requested source line, joined with the request
/// delimiter. Same input always produces the same output.
pub fn stub_response(request: &ExplanationRequest) -> RawResponse {
    let text = request
        .requested_lines()
        .iter()
        .map(|line| stub_explanation(line))
        .collect::<Vec<_>>()
        .join(request.delimiter());
    RawResponse {
        text,
        origin: ResponseOrigin::Stub,
    }
}

// ── Primary shape: Responses API ─────────────────────────────────────────

/// `POST {api_base}/responses` with the system and user prompts folded into
/// a single `input` string.
struct ResponsesApi;

#[async_trait]
impl InvocationStrategy for ResponsesApi {
    fn name(&self) -> &'static str {
        "responses-api"
    }

    fn origin(&self) -> ResponseOrigin {
        ResponseOrigin::Responses
    }

    async fn invoke(
        &self,
        client: &reqwest::Client,
        config: &ExplainConfig,
        api_key: &str,
        prompt: &PromptPair,
    ) -> Result<String, InvocationError> {
        let body = json!({
            "model": config.model,
            "input": format!("SYSTEM:\n{}\n\nUSER:\n{}", prompt.system, prompt.user),
        });
        let payload = post_json(
            client,
            &format!("{}/responses", config.api_base),
            api_key,
            config.api_timeout_secs,
            &body,
        )
        .await?;
        Ok(parse_responses_text(&payload))
    }
}

// ── Secondary shape: Chat Completions ────────────────────────────────────

/// `POST {api_base}/chat/completions` with separate system/user messages.
struct ChatCompletionsApi;

#[async_trait]
impl InvocationStrategy for ChatCompletionsApi {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    fn origin(&self) -> ResponseOrigin {
        ResponseOrigin::ChatCompletions
    }

    async fn invoke(
        &self,
        client: &reqwest::Client,
        config: &ExplainConfig,
        api_key: &str,
        prompt: &PromptPair,
    ) -> Result<String, InvocationError> {
        let body = json!({
            "model": config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        });
        let payload = post_json(
            client,
            &format!("{}/chat/completions", config.api_base),
            api_key,
            config.api_timeout_secs,
            &body,
        )
        .await?;
        Ok(parse_chat_text(&payload))
    }
}

// ── Shared transport ─────────────────────────────────────────────────────

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    timeout_secs: u64,
    body: &Value,
) -> Result<Value, InvocationError> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(timeout_secs))
        .json(body)
        .send()
        .await
        .map_err(|e| InvocationError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InvocationError::Status {
            status: status.as_u16(),
            body: clip(&body, 200),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| InvocationError::MalformedPayload(e.to_string()))
}

fn clip(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// ── Payload extraction ───────────────────────────────────────────────────

/// Pull the generated text out of a Responses-API payload.
///
/// Aggregates every `output_text` content part across `output` messages.
/// An unexpected but valid-JSON structure yields an empty string — that is
/// a structural success and the empty-text safety net handles it.
fn parse_responses_text(payload: &Value) -> String {
    // Convenience field emitted by some gateway deployments.
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }

    let mut out = String::new();
    if let Some(items) = payload.get("output").and_then(Value::as_array) {
        for item in items {
            if item.get("type").and_then(Value::as_str) != Some("message") {
                continue;
            }
            if let Some(parts) = item.get("content").and_then(Value::as_array) {
                for part in parts {
                    if part.get("type").and_then(Value::as_str) == Some("output_text") {
                        if let Some(text) = part.get("text").and_then(Value::as_str) {
                            out.push_str(text);
                        }
                    }
                }
            }
        }
    }
    out
}

/// Pull the generated text out of a Chat-Completions payload.
fn parse_chat_text(payload: &Value) -> String {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{DEFAULT_DELIMITER, STUB_LABEL};

    fn request(lines: &[&str]) -> ExplanationRequest {
        ExplanationRequest::new(
            lines.iter().map(|s| s.to_string()).collect(),
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn stub_response_is_deterministic_and_delimited() {
        let req = request(&["first line", "second line"]);
        let a = stub_response(&req);
        let b = stub_response(&req);
        assert_eq!(a.text, b.text);
        assert_eq!(a.origin, ResponseOrigin::Stub);
        assert_eq!(
            a.text,
            format!("{STUB_LABEL}first line{DEFAULT_DELIMITER}{STUB_LABEL}second line")
        );
    }

    #[test]
    fn stub_response_covers_only_the_requested_range() {
        let req = ExplanationRequest::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Some(1),
            Some(2),
            None,
        )
        .unwrap();
        let raw = stub_response(&req);
        assert_eq!(
            raw.text,
            format!("{STUB_LABEL}b{DEFAULT_DELIMITER}{STUB_LABEL}c")
        );
    }

    #[test]
    fn parse_responses_text_aggregates_output_parts() {
        let payload = json!({
            "output": [
                { "type": "reasoning", "content": [] },
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "hello " },
                        { "type": "output_text", "text": "world" }
                    ]
                }
            ]
        });
        assert_eq!(parse_responses_text(&payload), "hello world");
    }

    #[test]
    fn parse_responses_text_prefers_convenience_field() {
        let payload = json!({ "output_text": "direct" });
        assert_eq!(parse_responses_text(&payload), "direct");
    }

    #[test]
    fn parse_responses_text_unexpected_shape_is_empty() {
        assert_eq!(parse_responses_text(&json!({ "id": "resp_1" })), "");
    }

    #[test]
    fn parse_chat_text_reads_first_choice() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "answer" } }
            ]
        });
        assert_eq!(parse_chat_text(&payload), "answer");
    }

    #[test]
    fn parse_chat_text_missing_content_is_empty() {
        assert_eq!(parse_chat_text(&json!({ "choices": [] })), "");
    }

    #[test]
    fn strategy_order_is_responses_then_chat() {
        let chain = strategies();
        assert_eq!(chain[0].origin(), ResponseOrigin::Responses);
        assert_eq!(chain[1].origin(), ResponseOrigin::ChatCompletions);
    }

    #[tokio::test]
    async fn no_credential_short_circuits_to_stub() {
        // Default config carries no key; the adapter must not touch the
        // network (an attempt against the real base URL would error, and
        // the origin would not be Stub).
        let config = ExplainConfig::default();
        let client = reqwest::Client::new();
        let req = request(&["alpha", "beta"]);
        let prompt = crate::prompts::build_prompts(req.chunk_lines(), 0, 1, req.delimiter());

        let raw = produce_raw_text(&client, &config, &prompt, &req).await;
        assert_eq!(raw.origin, ResponseOrigin::Stub);
        assert!(raw.text.contains(STUB_LABEL));
    }
}
