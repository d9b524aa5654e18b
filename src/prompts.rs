//! Prompt templates and canned text for line-by-line explanation.
//!
//! Centralising every template here serves two purposes:
//!
//! 1. **Single source of truth** — the delimiter protocol spoken with the
//!    model (sentinel token, join instructions, stub text shape) is defined
//!    in exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the rendered prompts directly
//!    without a live model, making template regressions easy to catch.
//!
//! The templates are Japanese: the service explains English academic prose
//! to Japanese readers, one short explanation per requested line.

/// Sentinel token separating explanations in the model's raw response.
///
/// Chosen for low collision probability with legitimate explanation text;
/// callers overriding the delimiter accept the collision risk themselves.
pub const DEFAULT_DELIMITER: &str = "<<<SEP>>>";

/// The one tolerated mangling of [`DEFAULT_DELIMITER`]: some models insert
/// a stray space before the closing bracket. The aligner absorbs exactly
/// this variant and nothing else.
pub const DEFAULT_DELIMITER_SPACED: &str = "<<<SEP >>>";

/// Label prefixed to stub explanations.
pub const STUB_LABEL: &str = "要点: ";

/// Maximum number of characters of the source line kept in a stub explanation.
pub const STUB_MAX_CHARS: usize = 180;

/// System prompt template. The placeholder `{sep}` must be replaced with
/// the request delimiter before use.
const SYSTEM_TEMPLATE: &str = "あなたは学術論文の英文を日本語で噛み砕いて説明するアシスタントです。\n求められた行だけを順番に、一行ごとに簡潔に日本語で説明してください。\n出力は各行の説明のみで、前置きや後書きは禁止。各行の説明は区切り文字 {sep} で連結し、一つのテキストとして返してください。余計な空白や区切りの重複を入れないでください。";

/// A rendered system/user prompt pair, ready for any invocation strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Render every chunk line with a 1-indexed number, one per display line.
///
/// The whole chunk is always shown so the model sees surrounding context
/// even when only a sub-range is requested.
pub fn numbered_lines(lines: &[String]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system/user prompt pair for an inclusive 0-indexed line range.
///
/// `start` and `end` must already be validated against `chunk_lines`
/// (see [`crate::batch::ExplanationRequest`]).
pub fn build_prompts(
    chunk_lines: &[String],
    start: usize,
    end: usize,
    delimiter: &str,
) -> PromptPair {
    let system = SYSTEM_TEMPLATE.replace("{sep}", delimiter);
    let user = format!(
        "以下は論文の一部を行番号付きで示したものです。\n\n{lines}\n\n説明対象の行: {from} 行目から {to} 行目まで（両端含む）。\n各行に対して日本語の短い解説を一つずつ作成し、順番を保って{sep}で区切って返してください。",
        lines = numbered_lines(chunk_lines),
        from = start + 1,
        to = end + 1,
        sep = delimiter,
    );
    PromptPair { system, user }
}

/// Deterministic stand-in explanation for one source line.
///
/// Used by the local stub (no credential, or all remote attempts empty or
/// failed) and by the aligner when a fragment comes back empty. Truncation
/// counts characters, not bytes, so multi-byte text is never split.
pub fn stub_explanation(source_line: &str) -> String {
    format!("{STUB_LABEL}{}", truncate_chars(source_line, STUB_MAX_CHARS))
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
