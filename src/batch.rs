//! Request and outcome types for batch explanation.
//!
//! [`ExplanationRequest`] is the validated form of a wire request: once it
//! exists, the range invariants hold (`0 <= start <= end < len`) and every
//! later stage can index the chunk without re-checking. Construction is the
//! single place where wire leniency is applied — absent or non-integer
//! indices default to the full chunk, and an absent or empty delimiter
//! defaults to the sentinel.

use crate::error::ExplainError;
use crate::prompts::DEFAULT_DELIMITER;

/// A validated request to explain an inclusive sub-range of chunk lines.
#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    chunk_lines: Vec<String>,
    start: usize,
    end: usize,
    delimiter: String,
}

impl ExplanationRequest {
    /// Validate raw wire values into a request.
    ///
    /// Defaults: `start_index` → 0, `end_index` → last line, `delimiter` →
    /// [`DEFAULT_DELIMITER`] (an empty string counts as absent).
    ///
    /// # Errors
    /// [`ExplainError::EmptyChunk`] if `chunk_lines` is empty;
    /// [`ExplainError::InvalidRange`] if `start_index < 0`,
    /// `end_index >= chunk_lines.len()`, or `start_index > end_index`.
    pub fn new(
        chunk_lines: Vec<String>,
        start_index: Option<i64>,
        end_index: Option<i64>,
        delimiter: Option<String>,
    ) -> Result<Self, ExplainError> {
        if chunk_lines.is_empty() {
            return Err(ExplainError::EmptyChunk);
        }
        let len = chunk_lines.len();
        let start = start_index.unwrap_or(0);
        let end = end_index.unwrap_or(len as i64 - 1);

        if start < 0 || end >= len as i64 || start > end {
            return Err(ExplainError::InvalidRange { start, end, len });
        }

        let delimiter = delimiter
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

        Ok(Self {
            chunk_lines,
            start: start as usize,
            end: end as usize,
            delimiter,
        })
    }

    /// Every line of the chunk (context for the model).
    pub fn chunk_lines(&self) -> &[String] {
        &self.chunk_lines
    }

    /// First requested line, 0-indexed inclusive.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last requested line, 0-indexed inclusive.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Delimiter joining explanations in the raw response.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The requested sub-range of the chunk.
    pub fn requested_lines(&self) -> &[String] {
        &self.chunk_lines[self.start..=self.end]
    }

    /// Number of explanations the caller must receive.
    pub fn expected_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Which invocation path produced the raw text a result was aligned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrigin {
    /// Primary call shape succeeded structurally.
    Responses,
    /// Secondary call shape succeeded structurally.
    ChatCompletions,
    /// Deterministic local stub (no credential, empty text, or both
    /// remote attempts failed).
    Stub,
}

impl ResponseOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseOrigin::Responses => "responses",
            ResponseOrigin::ChatCompletions => "chat_completions",
            ResponseOrigin::Stub => "stub",
        }
    }
}

/// The aligned result of one batch explanation.
///
/// `explanations.len()` always equals the request's
/// [`expected_count`](ExplanationRequest::expected_count), and no element is
/// empty. `origin` is kept for logs and tests; it is not part of the wire
/// response.
#[derive(Debug, Clone)]
pub struct ExplanationOutcome {
    pub explanations: Vec<String>,
    pub origin: ResponseOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn defaults_cover_whole_chunk() {
        let req = ExplanationRequest::new(lines(3), None, None, None).unwrap();
        assert_eq!(req.start(), 0);
        assert_eq!(req.end(), 2);
        assert_eq!(req.expected_count(), 3);
        assert_eq!(req.delimiter(), DEFAULT_DELIMITER);
    }

    #[test]
    fn requested_lines_is_the_inclusive_slice() {
        let req = ExplanationRequest::new(lines(5), Some(1), Some(3), None).unwrap();
        assert_eq!(req.requested_lines(), &lines(5)[1..=3]);
        assert_eq!(req.expected_count(), 3);
    }

    #[test]
    fn empty_chunk_rejected() {
        let err = ExplanationRequest::new(vec![], None, None, None).unwrap_err();
        assert!(matches!(err, ExplainError::EmptyChunk));
    }

    #[test]
    fn negative_start_rejected() {
        let err = ExplanationRequest::new(lines(3), Some(-1), Some(2), None).unwrap_err();
        assert!(matches!(err, ExplainError::InvalidRange { start: -1, .. }));
    }

    #[test]
    fn end_past_chunk_rejected() {
        let err = ExplanationRequest::new(lines(3), Some(0), Some(3), None).unwrap_err();
        assert!(matches!(err, ExplainError::InvalidRange { end: 3, len: 3, .. }));
    }

    #[test]
    fn start_after_end_rejected() {
        let err = ExplanationRequest::new(lines(3), Some(2), Some(1), None).unwrap_err();
        assert!(matches!(err, ExplainError::InvalidRange { .. }));
    }

    #[test]
    fn default_end_with_large_start_rejected() {
        // start beyond the defaulted end (len-1) must fail the same way.
        let err = ExplanationRequest::new(lines(3), Some(5), None, None).unwrap_err();
        assert!(matches!(err, ExplainError::InvalidRange { start: 5, .. }));
    }

    #[test]
    fn empty_delimiter_falls_back_to_sentinel() {
        let req =
            ExplanationRequest::new(lines(2), None, None, Some(String::new())).unwrap();
        assert_eq!(req.delimiter(), DEFAULT_DELIMITER);
    }

    #[test]
    fn custom_delimiter_kept_verbatim() {
        let req = ExplanationRequest::new(lines(2), None, None, Some("|".into())).unwrap();
        assert_eq!(req.delimiter(), "|");
    }

    #[test]
    fn single_line_chunk_single_line_range() {
        let req = ExplanationRequest::new(lines(1), Some(0), Some(0), None).unwrap();
        assert_eq!(req.expected_count(), 1);
    }
}
