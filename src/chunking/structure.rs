//! Structure-driven chunking: paragraphs and document sections.
//!
//! The paragraph strategy splits on blank lines and emits one chunk per
//! surviving paragraph. `paragraph_index` counts the paragraph's position in
//! the non-empty paragraph stream, so paragraphs dropped for being under the
//! minimum size leave gaps in it while `chunk_index` stays dense.
//!
//! The section strategy scans lines against the header forms that open
//! filing sections (`Item 1:`, `Section 2-`, `Part II:`, `1. Title`). A
//! matching line closes the accumulated section and opens a new one named by
//! that line; until a header is seen, the first line provides a truncated
//! fallback title. Unlike the paragraph strategy, `chunk_index` here is dense
//! over surviving sections in emission order.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde_json::Value;

use super::boundary::trimmed_span;
use super::{ChunkDraft, ChunkingOptions};

/// Header forms that open a new filing section.
static SECTION_HEADERS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)^item\s+\d+[a-z]?\s*[:\-]",
        r"(?i)^section\s+\d+[a-z]?\s*[:\-]",
        r"(?i)^part\s+[ivx]+[a-z]?\s*[:\-]",
        r"(?i)^\d+\.\s+[a-z]",
    ])
    .expect("section header patterns")
});

pub(crate) fn split_paragraphs(text: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let mut segments = Vec::new();
    let mut last = 0;
    for (position, _) in text.match_indices("\n\n") {
        segments.push((last, position));
        last = position + 2;
    }
    segments.push((last, text.len()));

    let mut drafts = Vec::new();
    let mut paragraph_index = 0u64;
    for (segment_start, segment_end) in segments {
        let Some((start, end)) = trimmed_span(text, segment_start, segment_end) else {
            continue;
        };
        if end - start >= options.min_chunk_size {
            drafts.push(ChunkDraft {
                text: text[start..end].to_string(),
                start,
                end,
                extra: vec![("paragraph_index", Value::from(paragraph_index))],
            });
        }
        paragraph_index += 1;
    }
    drafts
}

struct RawSection {
    title: String,
    lines: Vec<String>,
    start: usize,
    end: usize,
}

impl RawSection {
    fn content(&self) -> String {
        self.lines.join("\n")
    }
}

pub(crate) fn split_sections(text: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let mut sections: Vec<RawSection> = Vec::new();
    let mut title = String::new();
    let mut lines: Vec<String> = Vec::new();
    let mut span: Option<(usize, usize)> = None;
    let mut offset = 0;

    for line in text.split('\n') {
        let line_start = offset;
        offset += line.len() + 1;

        let Some((start, end)) = trimmed_span(text, line_start, line_start + line.len()) else {
            continue;
        };
        let stripped = &text[start..end];

        if SECTION_HEADERS.is_match(stripped) && !lines.is_empty() {
            let (section_start, section_end) = span.unwrap_or((start, end));
            sections.push(RawSection {
                title: std::mem::take(&mut title),
                lines: std::mem::take(&mut lines),
                start: section_start,
                end: section_end,
            });
            title = stripped.to_string();
            lines.push(stripped.to_string());
            span = Some((start, end));
        } else {
            lines.push(stripped.to_string());
            span = Some((span.map_or(start, |(s, _)| s), end));
            if title.is_empty() {
                title = fallback_title(stripped);
            }
        }
    }
    if !lines.is_empty() {
        let (section_start, section_end) = span.unwrap_or((0, 0));
        sections.push(RawSection {
            title,
            lines,
            start: section_start,
            end: section_end,
        });
    }

    let mut drafts = Vec::new();
    for section in sections {
        let content = section.content();
        if content.len() < options.min_chunk_size {
            continue;
        }
        let section_type = if section.title.contains("Item") {
            "item"
        } else {
            "section"
        };
        drafts.push(ChunkDraft {
            text: content,
            start: section.start,
            end: section.end,
            extra: vec![
                ("section_title", Value::from(section.title)),
                ("section_type", Value::from(section_type)),
            ],
        });
    }
    drafts
}

/// Truncated title drawn from the first body line when no header has matched.
fn fallback_title(line: &str) -> String {
    match line.char_indices().nth(50) {
        Some((byte_index, _)) => format!("{}...", &line[..byte_index]),
        None => line.to_string(),
    }
}
