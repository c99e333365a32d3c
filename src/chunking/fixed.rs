//! Fixed-size sliding window chunking.
//!
//! Advances a window of `chunk_size` bytes across the text. Each window's
//! right edge is pulled back to the nearest sentence boundary unless it
//! already sits at end-of-text, so windows never cut mid-sentence when a
//! terminator is in range. Consecutive windows overlap by `overlap_size`
//! bytes; a start that would not advance is forced to the previous end so the
//! run always terminates.

use super::boundary::find_sentence_boundary;
use super::{ChunkDraft, ChunkingOptions};

pub(crate) fn split(text: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let mut drafts = Vec::new();
    if text.is_empty() {
        return drafts;
    }

    let mut start = 0;
    while start < text.len() {
        let mut end = (start + options.chunk_size).min(text.len());
        while end < text.len() && !text.is_char_boundary(end) {
            end += 1;
        }
        if end < text.len() {
            end = find_sentence_boundary(text, start, end);
        }

        let trimmed = text[start..end].trim();
        if trimmed.len() >= options.min_chunk_size {
            drafts.push(ChunkDraft {
                text: trimmed.to_string(),
                start,
                end,
                extra: Vec::new(),
            });
        }

        if end == text.len() {
            break;
        }

        // Overlap the next window; force progress when overlap would stall it.
        let next = end.saturating_sub(options.overlap_size);
        start = if next > start { next } else { end };
        while start < text.len() && !text.is_char_boundary(start) {
            start += 1;
        }
    }

    drafts
}
