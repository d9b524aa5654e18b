//! # readpaper
//!
//! Explain academic papers line by line, in Japanese, using an LLM backend.
//!
//! ## Why this crate?
//!
//! Reading an English paper sentence by sentence is slow when every second
//! sentence needs unpacking. This service takes the extracted text of a
//! paper (a PDF processed client-side, or a web page fetched here), treats
//! it as an ordered sequence of rough sentence-level lines, and returns one
//! short Japanese explanation per requested line — always exactly one per
//! line, in order, no matter how loosely the model followed its formatting
//! instructions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page / PDF text
//!  │
//!  ├─ 1. Extract  strip HTML, split into rough lines, chunk (≤200 lines)
//!  ├─ 2. Request  validate range, render numbered context + prompts
//!  ├─ 3. Invoke   primary call shape → secondary shape → local stub
//!  └─ 4. Align    tolerant delimiter split, pad/truncate, stub fill-in
//! ```
//!
//! The aligner is the load-bearing piece: callers always receive exactly
//! `endIndex - startIndex + 1` non-empty explanations, whatever the raw
//! model output looked like. Everything upstream of it degrades gracefully —
//! a missing credential or a dead backend still produces a usable (if
//! generic) result via the deterministic stub.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use readpaper::{explain_batch, ExplainConfig, ExplanationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential picked up from OPENAI_API_KEY; absent means stub mode.
//!     let config = ExplainConfig::from_env();
//!     let client = reqwest::Client::new();
//!
//!     let request = ExplanationRequest::new(
//!         vec!["Attention is all you need.".into()],
//!         None,
//!         None,
//!         None,
//!     )?;
//!     let outcome = explain_batch(&client, &config, &request).await;
//!     println!("{}", outcome.explanations[0]);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `readpaper` server binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! readpaper = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod explain;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{ExplanationOutcome, ExplanationRequest, ResponseOrigin};
pub use config::{ExplainConfig, ExplainConfigBuilder, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::{ExplainError, InvocationError};
pub use explain::explain_batch;
pub use pipeline::extract::{chunk_lines, lines_from_html, split_rough_lines, MAX_LINES_PER_CHUNK};
pub use prompts::{DEFAULT_DELIMITER, STUB_LABEL};
pub use server::{router, serve, AppState};
