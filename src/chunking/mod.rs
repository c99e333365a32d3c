//! Strategy-selected chunking of long-form filing text.
//!
//! [`chunk_text`] is the single entry point: it validates the sizing options,
//! dispatches on [`ChunkingStrategy`], and finalizes the resulting drafts
//! into [`Chunk`] records. Finalization is a second pass run once the full
//! sequence is known, which is the only way `total_chunks` can be stamped
//! into every chunk's metadata; chunks are immutable afterwards.
//!
//! The section-aware entry point that pairs the chunker with per-category
//! sizing profiles lives in [`profiles`].

pub mod boundary;
pub mod fixed;
pub mod profiles;
pub mod sentence;
pub mod structure;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::types::{Chunk, ChunkingError, Metadata, insert_reserved, source_label};

pub use boundary::{SentenceSpan, find_sentence_boundary, split_sentences};
pub use profiles::{FilingSection, SectionCategory, SectionProfile, chunk_filing_sections};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP_SIZE: usize = 200;
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;

/// How input text is segmented into chunks.
///
/// A closed set: dispatch is an exhaustive match, so adding a strategy is a
/// compile-time-checked change rather than a string comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Sliding window of `chunk_size` bytes snapped back to sentence ends.
    FixedSize,
    /// Sentences aggregated up to `max_chunk_size` with sentence-level overlap.
    Sentence,
    /// One chunk per blank-line-separated paragraph.
    Paragraph,
    /// One chunk per recognized document section (`Item 1:`, `Part II:`, ...).
    Section,
    /// Placeholder for topic-aware segmentation; falls back to [`Self::Sentence`].
    Semantic,
}

impl ChunkingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkingStrategy::FixedSize => "fixed_size",
            ChunkingStrategy::Sentence => "sentence",
            ChunkingStrategy::Paragraph => "paragraph",
            ChunkingStrategy::Section => "section",
            ChunkingStrategy::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing knobs shared by the chunking strategies.
///
/// Sizes are in bytes of UTF-8 text. Every strategy drops chunks whose
/// trimmed text is shorter than `min_chunk_size`; the sentence strategy also
/// caps accumulation at `max_chunk_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub chunk_size: usize,
    pub overlap_size: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl ChunkingOptions {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_overlap_size(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    #[must_use]
    pub fn with_min_chunk_size(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    #[must_use]
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Rejects configurations that cannot make progress.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidOptions {
                reason: "chunk_size must be at least 1".into(),
            });
        }
        if self.min_chunk_size > self.max_chunk_size {
            return Err(ChunkingError::InvalidOptions {
                reason: format!(
                    "min_chunk_size ({}) exceeds max_chunk_size ({})",
                    self.min_chunk_size, self.max_chunk_size
                ),
            });
        }
        Ok(())
    }
}

/// Intermediate chunk produced by a strategy before ids and counts exist.
pub(crate) struct ChunkDraft {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Strategy-specific metadata stamped during finalization.
    pub extra: Vec<(&'static str, Value)>,
}

/// Chunks `text` with the selected strategy.
///
/// `metadata` is merged into every chunk; a `source_id` entry, when present,
/// prefixes the generated `chunk_id`s. Strategy-owned keys
/// ([`crate::types::RESERVED_METADATA_KEYS`]) displace caller values with a
/// logged warning.
pub fn chunk_text(
    text: &str,
    strategy: ChunkingStrategy,
    options: &ChunkingOptions,
    metadata: &Metadata,
) -> Result<Vec<Chunk>, ChunkingError> {
    options.validate()?;

    let drafts = match strategy {
        ChunkingStrategy::FixedSize => fixed::split(text, options),
        ChunkingStrategy::Sentence => sentence::split(text, options),
        ChunkingStrategy::Paragraph => structure::split_paragraphs(text, options),
        ChunkingStrategy::Section => structure::split_sections(text, options),
        ChunkingStrategy::Semantic => {
            warn!("semantic chunking not implemented; falling back to sentence aggregation");
            let fallback = ChunkingOptions {
                max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
                ..*options
            };
            sentence::split(text, &fallback)
        }
    };

    let chunks = finalize(drafts, metadata);
    debug!(%strategy, chunks = chunks.len(), "chunking complete");
    Ok(chunks)
}

/// Turns drafts into immutable chunks once the run's total is known.
fn finalize(drafts: Vec<ChunkDraft>, base_metadata: &Metadata) -> Vec<Chunk> {
    let total = drafts.len();
    let source = source_label(base_metadata);
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let mut metadata = base_metadata.clone();
            for (key, value) in draft.extra {
                insert_reserved(&mut metadata, key, value);
            }
            insert_reserved(&mut metadata, "chunk_index", Value::from(index as u64));
            insert_reserved(&mut metadata, "total_chunks", Value::from(total as u64));
            Chunk {
                chunk_id: format!("{source}_{index}"),
                text: draft.text,
                start_pos: draft.start,
                end_pos: draft.end,
                metadata,
            }
        })
        .collect()
}
