//! Batch explanation entry point.
//!
//! Ties the pipeline stages together for one validated request: render the
//! prompt pair, obtain raw text (remote or stub), and align it to exactly
//! the requested number of explanations. Validation happens when the
//! [`ExplanationRequest`] is constructed, so this function cannot fail —
//! the degraded-but-present guarantee of the explanation endpoint starts
//! here.

use crate::batch::{ExplanationOutcome, ExplanationRequest};
use crate::config::ExplainConfig;
use crate::pipeline::{align, invoke};
use crate::prompts;
use tracing::info;

/// Explain the requested sub-range of a chunk.
///
/// Always returns exactly `request.expected_count()` non-empty explanations
/// in line order, regardless of how the model behaved.
pub async fn explain_batch(
    client: &reqwest::Client,
    config: &ExplainConfig,
    request: &ExplanationRequest,
) -> ExplanationOutcome {
    // ── Step 1: Render prompts ───────────────────────────────────────────
    let prompt = prompts::build_prompts(
        request.chunk_lines(),
        request.start(),
        request.end(),
        request.delimiter(),
    );

    // ── Step 2: Obtain raw text (remote, with stub fallback) ─────────────
    let raw = invoke::produce_raw_text(client, config, &prompt, request).await;

    // ── Step 3: Align to the requested count ─────────────────────────────
    let explanations = align::align_response(&raw.text, request.delimiter(), request.requested_lines());

    info!(
        "explained lines {}..={} ({} explanations, origin: {})",
        request.start(),
        request.end(),
        explanations.len(),
        raw.origin.as_str()
    );

    ExplanationOutcome {
        explanations,
        origin: raw.origin,
    }
}
