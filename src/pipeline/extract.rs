//! Text extraction: fetched HTML → plain text → rough lines.
//!
//! PDFs and web pages do not preserve true lines, so the service works with
//! *approximate* lines: the page text is flattened to a single
//! whitespace-collapsed string, then split at newlines and at sentence-ending
//! punctuation followed by whitespace. The splitting rules here mirror the
//! browser-side PDF collaborator so both input paths produce the same shape
//! of line sequence.
//!
//! Every pass is a pure function (`&str → String` / `&str → Vec<String>`)
//! with no shared state.

use once_cell::sync::Lazy;
use regex::Regex;

// ── HTML → text ──────────────────────────────────────────────────────────

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip an HTML document down to its visible text.
///
/// Passes (applied in order):
/// 1. Remove `<script>…</script>` blocks (case-insensitive, spans lines)
/// 2. Remove `<style>…</style>` blocks
/// 3. Replace every remaining tag with a space
/// 4. Decode `&nbsp;` and `&amp;`
/// 5. Collapse all whitespace runs to a single space and trim
pub fn html_to_text(html: &str) -> String {
    let s = RE_SCRIPT.replace_all(html, " ");
    let s = RE_STYLE.replace_all(&s, " ");
    let s = RE_TAG.replace_all(&s, " ");
    let s = s.replace("&nbsp;", " ").replace("&amp;", "&");
    RE_WHITESPACE.replace_all(&s, " ").trim().to_string()
}

// ── Text → rough lines ───────────────────────────────────────────────────

/// Characters that end a sentence for splitting purposes.
///
/// Covers both Latin and Japanese full-width punctuation because papers
/// fetched as web pages frequently mix the two.
const SENTENCE_ENDINGS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Split flattened text into rough, sentence-approximate lines.
///
/// A boundary is either a newline or any whitespace that directly follows a
/// sentence-ending character. Each piece is trimmed; empty pieces are
/// dropped. (The regex crate has no look-behind, so this is a hand-rolled
/// scan rather than a pattern.)
pub fn split_rough_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut last_significant: Option<char> = None;

    for ch in text.chars() {
        if ch == '\n' {
            flush(&mut current, &mut lines);
            last_significant = None;
            continue;
        }
        if ch.is_whitespace() && last_significant.is_some_and(|c| SENTENCE_ENDINGS.contains(&c)) {
            flush(&mut current, &mut lines);
            last_significant = None;
            continue;
        }
        current.push(ch);
        if !ch.is_whitespace() {
            last_significant = Some(ch);
        }
    }
    flush(&mut current, &mut lines);
    lines
}

fn flush(current: &mut String, lines: &mut Vec<String>) {
    let piece = current.trim();
    if !piece.is_empty() {
        lines.push(piece.to_string());
    }
    current.clear();
}

/// Convenience composition used by the fetch-url endpoint.
pub fn lines_from_html(html: &str) -> Vec<String> {
    split_rough_lines(&html_to_text(html))
}

// ── Chunking ─────────────────────────────────────────────────────────────

/// Default batch size for [`chunk_lines`].
pub const MAX_LINES_PER_CHUNK: usize = 200;

/// Split a line sequence into fixed-size ordered batches.
///
/// Boundaries are purely positional; the final chunk may be shorter.
/// `max_per_chunk` is clamped to at least 1.
pub fn chunk_lines(lines: &[String], max_per_chunk: usize) -> Vec<Vec<String>> {
    let size = max_per_chunk.max(1);
    lines.chunks(size).map(|c| c.to_vec()).collect()
}
