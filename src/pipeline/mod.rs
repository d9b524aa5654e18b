//! Pipeline stages for batch explanation.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. replace the delimiter protocol with a structured
//! one) without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ (caller picks a chunk + range) ──▶ invoke ──▶ align
//! (HTML→lines)                                  (LLM/stub)  (repair)
//! ```
//!
//! 1. [`extract`] — strip fetched HTML to text and split it into rough,
//!    sentence-approximate lines; also the pure chunking helper
//! 2. [`invoke`]  — drive the model backend through an ordered list of call
//!    shapes, falling back to the deterministic local stub; the only stage
//!    with network I/O
//! 3. [`align`]   — reconcile the raw response with the requested line
//!    count: tolerant delimiter split, trim, pad/truncate, stub fill-in

pub mod align;
pub mod extract;
pub mod invoke;
