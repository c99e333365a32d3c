//! Sentence boundary detection and offset-tracking sentence splitting.
//!
//! Both helpers operate on byte offsets that always land on `char`
//! boundaries, so every returned span can slice the original text directly.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of sentence-terminating punctuation used to split prose.
static SENTENCE_ENDINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence ending pattern"));

/// Finds the nearest sentence boundary within `start..end`.
///
/// Scans backward from `end` and returns the index just past the first
/// sentence-terminating character (`.`, `!`, `?`) strictly after `start`.
/// Returns `end` unchanged when no terminator is found, leaving the cut
/// mid-sentence as a last resort. Total over any `0 <= start <= end <= len`;
/// offsets inside a multi-byte character are snapped inward first.
pub fn find_sentence_boundary(text: &str, start: usize, end: usize) -> usize {
    let mut start = start.min(text.len());
    let mut end = end.min(text.len());
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }

    for (offset, ch) in text[start..end].char_indices().rev() {
        // The character at `start` itself is excluded from the scan.
        if offset == 0 {
            break;
        }
        if matches!(ch, '.' | '!' | '?') {
            return start + offset + ch.len_utf8();
        }
    }
    end
}

/// A trimmed sentence with its byte span in the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Splits text into trimmed sentences on runs of `.`, `!`, `?`.
///
/// Terminating punctuation and inter-sentence whitespace are not preserved;
/// empty fragments are discarded. Each surviving sentence carries the byte
/// span of its trimmed text, which downstream strategies use to recover
/// chunk positions without re-searching the document.
pub fn split_sentences(text: &str) -> Vec<SentenceSpan> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for separator in SENTENCE_ENDINGS.find_iter(text) {
        if let Some((start, end)) = trimmed_span(text, last, separator.start()) {
            sentences.push(SentenceSpan {
                text: text[start..end].to_string(),
                start,
                end,
            });
        }
        last = separator.end();
    }
    if let Some((start, end)) = trimmed_span(text, last, text.len()) {
        sentences.push(SentenceSpan {
            text: text[start..end].to_string(),
            start,
            end,
        });
    }
    sentences
}

/// Narrows `start..end` to the whitespace-trimmed span, or `None` if nothing
/// remains.
pub(crate) fn trimmed_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let raw = &text[start..end];
    let stripped = raw.trim_start();
    let lead = raw.len() - stripped.len();
    let stripped = stripped.trim_end();
    if stripped.is_empty() {
        return None;
    }
    let begin = start + lead;
    Some((begin, begin + stripped.len()))
}
