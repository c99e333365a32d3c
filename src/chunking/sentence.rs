//! Sentence-aggregating chunking.
//!
//! Sentences are accumulated into the current chunk until adding the next one
//! would push the accumulated size past `max_chunk_size` *and* the chunk
//! already meets `min_chunk_size`. The finalized chunk is the sentences
//! joined with single spaces; the next chunk is seeded with trailing
//! sentences from the previous one, pulled from the end backward while their
//! cumulative length stays within `overlap_size`, in original order.
//!
//! Positions come from the sentence spans tracked by the splitter: a chunk's
//! span runs from its first sentence's start to its last sentence's end in
//! the original text.

use serde_json::Value;

use super::boundary::{SentenceSpan, split_sentences};
use super::{ChunkDraft, ChunkingOptions};

pub(crate) fn split(text: &str, options: &ChunkingOptions) -> Vec<ChunkDraft> {
    let sentences = split_sentences(text);
    let mut drafts = Vec::new();
    let mut current: Vec<SentenceSpan> = Vec::new();
    let mut current_size = 0;

    for sentence in sentences {
        let sentence_size = sentence.text.len();
        let over_budget = current_size + sentence_size > options.max_chunk_size;
        if over_budget && !current.is_empty() && current_size >= options.min_chunk_size {
            drafts.push(draft_from(&current));

            let mut seeded = overlap_tail(&current, options.overlap_size);
            seeded.push(sentence);
            current_size = seeded.iter().map(|s| s.text.len()).sum();
            current = seeded;
        } else {
            current_size += sentence_size;
            current.push(sentence);
        }
    }

    if !current.is_empty() && current_size >= options.min_chunk_size {
        drafts.push(draft_from(&current));
    }

    drafts
}

fn draft_from(sentences: &[SentenceSpan]) -> ChunkDraft {
    let text = sentences
        .iter()
        .map(|sentence| sentence.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    ChunkDraft {
        start: sentences.first().map_or(0, |sentence| sentence.start),
        end: sentences.last().map_or(0, |sentence| sentence.end),
        extra: vec![("sentence_count", Value::from(sentences.len() as u64))],
        text,
    }
}

/// Trailing sentences whose cumulative length fits within `overlap_size`,
/// in original order.
fn overlap_tail(sentences: &[SentenceSpan], overlap_size: usize) -> Vec<SentenceSpan> {
    let mut kept = 0;
    let mut budget = 0;
    for sentence in sentences.iter().rev() {
        if budget + sentence.text.len() > overlap_size {
            break;
        }
        budget += sentence.text.len();
        kept += 1;
    }
    sentences[sentences.len() - kept..].to_vec()
}
