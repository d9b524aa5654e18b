//! Error types for the readpaper library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExplainError`] — **Surfaced**: the request cannot be served at all
//!   (empty input, invalid range, upstream page fetch failed). Returned as
//!   `Err(ExplainError)` from validation and the fetch path, and mapped to
//!   an HTTP status plus a stable machine-readable `error` code by the
//!   server layer.
//!
//! * [`InvocationError`] — **Absorbed**: a single model-invocation attempt
//!   failed (non-2xx, transport error, unparseable body). Logged by the
//!   invocation adapter, which then tries the next strategy or falls back to
//!   the local stub. Never reaches the caller.
//!
//! The separation keeps the explanation endpoint's degraded-but-present
//! guarantee honest: everything that can go wrong while talking to the model
//! backend lives in [`InvocationError`] and is repaired, while everything in
//! [`ExplainError`] is a real contract violation the caller must see.

use thiserror::Error;

/// All surfaced errors returned by the readpaper library.
///
/// Per-attempt invocation failures use [`InvocationError`] and are absorbed
/// by the invocation adapter rather than propagated here.
#[derive(Debug, Error)]
pub enum ExplainError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// `chunkLines` was missing, not an array of strings, or empty.
    #[error("chunkLines must be a non-empty array of strings")]
    EmptyChunk,

    /// The requested line range does not fit inside the chunk.
    #[error("invalid range: startIndex={start}, endIndex={end}, chunk has {len} lines")]
    InvalidRange { start: i64, end: i64, len: usize },

    /// `url` was missing or empty on the fetch endpoint.
    #[error("url is required")]
    UrlRequired,

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The fetched page answered with a non-success status.
    #[error("upstream returned HTTP {status} for '{url}'")]
    UpstreamStatus { url: String, status: u16 },

    /// The page fetch failed before producing a response (DNS, TLS, timeout).
    #[error("failed to fetch '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExplainError {
    /// Stable machine-readable code for the wire `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            ExplainError::EmptyChunk => "chunk_lines_required",
            ExplainError::InvalidRange { .. } => "invalid_range",
            ExplainError::UrlRequired => "url_required",
            ExplainError::UpstreamStatus { .. } => "bad_gateway",
            ExplainError::FetchFailed { .. } => "server_error",
            ExplainError::InvalidConfig(_) => "invalid_config",
            ExplainError::Internal(_) => "server_error",
        }
    }
}

/// A non-fatal failure of a single model-invocation attempt.
///
/// Logged by [`crate::pipeline::invoke`] at `warn` level; the adapter moves
/// on to the next strategy (or the stub) instead of propagating.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The backend answered with a non-success status.
    #[error("model backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the JSON shape this strategy expects.
    #[error("malformed response payload: {0}")]
    MalformedPayload(String),
}
