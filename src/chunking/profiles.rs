//! Per-category sizing profiles and section-aware chunking.
//!
//! Filing sections differ in texture: financial statements are dense tables
//! that retrieve best in small chunks, risk factors and business narratives
//! read better in larger spans with more overlap. [`SectionCategory`] closes
//! over the recognized categories and [`SectionCategory::profile`] maps each
//! to its recommended `(chunk_size, overlap)` pair.
//!
//! [`chunk_filing_sections`] applies the table: every pre-classified section
//! is chunked independently with the sliding window at its profile's sizing,
//! and the resulting chunks carry the category, the profile values used, and
//! a per-section strategy label. No overlap is attempted across section
//! boundaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use super::{ChunkingOptions, ChunkingStrategy, DEFAULT_MIN_CHUNK_SIZE, chunk_text};
use crate::types::{Chunk, ChunkingError, Metadata, insert_reserved, source_label};

/// Document-section categories recognized in regulatory filings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Business,
    RiskFactors,
    FinancialStatements,
    ManagementDiscussion,
    Legal,
    Properties,
    Other,
}

/// Recommended sizing for one section category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionProfile {
    pub chunk_size: usize,
    pub overlap: usize,
    pub description: &'static str,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 7] = [
        SectionCategory::Business,
        SectionCategory::RiskFactors,
        SectionCategory::FinancialStatements,
        SectionCategory::ManagementDiscussion,
        SectionCategory::Legal,
        SectionCategory::Properties,
        SectionCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionCategory::Business => "business",
            SectionCategory::RiskFactors => "risk_factors",
            SectionCategory::FinancialStatements => "financial_statements",
            SectionCategory::ManagementDiscussion => "management_discussion",
            SectionCategory::Legal => "legal",
            SectionCategory::Properties => "properties",
            SectionCategory::Other => "other",
        }
    }

    /// The recommended sizing profile for this category.
    pub fn profile(self) -> SectionProfile {
        match self {
            SectionCategory::FinancialStatements => SectionProfile {
                chunk_size: 800,
                overlap: 100,
                description: "Dense financial data - smaller chunks",
            },
            SectionCategory::RiskFactors => SectionProfile {
                chunk_size: 1200,
                overlap: 250,
                description: "Detailed risk analysis - medium chunks with more overlap",
            },
            SectionCategory::Business => SectionProfile {
                chunk_size: 1500,
                overlap: 300,
                description: "Company overview - larger chunks for narrative flow",
            },
            SectionCategory::ManagementDiscussion => SectionProfile {
                chunk_size: 1400,
                overlap: 280,
                description: "Management analysis - analytical content",
            },
            SectionCategory::Legal => SectionProfile {
                chunk_size: 1000,
                overlap: 200,
                description: "Legal proceedings - factual content",
            },
            SectionCategory::Properties => SectionProfile {
                chunk_size: 900,
                overlap: 150,
                description: "Property information - structured data",
            },
            SectionCategory::Other => SectionProfile {
                chunk_size: 1000,
                overlap: 200,
                description: "Other sections - default configuration",
            },
        }
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pre-classified filing section ready for section-aware chunking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilingSection {
    pub name: String,
    pub category: SectionCategory,
    pub text: String,
}

impl FilingSection {
    pub fn new(
        name: impl Into<String>,
        category: SectionCategory,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            text: text.into(),
        }
    }
}

/// Chunks each section with its category's sizing profile.
///
/// Sections are processed in input order and their chunks concatenated; each
/// section is an independent chunking run, so `total_chunks` counts chunks
/// within the section. Per-section source labels are suffixed with the
/// section name, keeping `chunk_id`s unique across the combined result.
pub fn chunk_filing_sections(
    sections: &[FilingSection],
    base_metadata: &Metadata,
) -> Result<Vec<Chunk>, ChunkingError> {
    let source = source_label(base_metadata);
    let mut all_chunks = Vec::new();

    for section in sections {
        let profile = section.category.profile();
        debug!(
            section = %section.name,
            category = %section.category,
            chunk_size = profile.chunk_size,
            overlap = profile.overlap,
            "chunking filing section"
        );

        let mut metadata = base_metadata.clone();
        metadata.insert(
            "source_id".to_string(),
            Value::from(format!("{source}/{}", section.name)),
        );
        insert_reserved(&mut metadata, "section", Value::from(section.name.clone()));
        insert_reserved(
            &mut metadata,
            "section_type",
            Value::from(section.category.as_str()),
        );
        insert_reserved(
            &mut metadata,
            "chunking_strategy",
            Value::from(format!("section_aware_{}", section.name)),
        );
        insert_reserved(
            &mut metadata,
            "optimal_chunk_size",
            Value::from(profile.chunk_size as u64),
        );
        insert_reserved(
            &mut metadata,
            "optimal_overlap",
            Value::from(profile.overlap as u64),
        );

        let options = ChunkingOptions::default()
            .with_chunk_size(profile.chunk_size)
            .with_overlap_size(profile.overlap)
            .with_min_chunk_size(DEFAULT_MIN_CHUNK_SIZE);
        let chunks = chunk_text(&section.text, ChunkingStrategy::FixedSize, &options, &metadata)?;
        all_chunks.extend(chunks);
    }

    Ok(all_chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_table_matches_recommended_sizing() {
        let financial = SectionCategory::FinancialStatements.profile();
        assert_eq!((financial.chunk_size, financial.overlap), (800, 100));
        let risk = SectionCategory::RiskFactors.profile();
        assert_eq!((risk.chunk_size, risk.overlap), (1200, 250));
        let business = SectionCategory::Business.profile();
        assert_eq!((business.chunk_size, business.overlap), (1500, 300));
        let mdna = SectionCategory::ManagementDiscussion.profile();
        assert_eq!((mdna.chunk_size, mdna.overlap), (1400, 280));
        let other = SectionCategory::Other.profile();
        assert_eq!((other.chunk_size, other.overlap), (1000, 200));
    }

    #[test]
    fn every_category_has_a_profile_and_label() {
        for category in SectionCategory::ALL {
            let profile = category.profile();
            assert!(profile.chunk_size > profile.overlap);
            assert!(!category.as_str().is_empty());
        }
    }

    fn long_section(word: &str) -> String {
        std::iter::repeat_n(word, 120)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn sections_are_stamped_with_their_profile() {
        let sections = vec![
            FilingSection::new("Item 1", SectionCategory::Business, long_section("widgets")),
            FilingSection::new(
                "Item 8",
                SectionCategory::FinancialStatements,
                long_section("assets"),
            ),
        ];
        let mut base = Metadata::new();
        base.insert("source_id".into(), json!("acme-10k"));

        let chunks = chunk_filing_sections(&sections, &base).unwrap();
        assert!(!chunks.is_empty());

        let business: Vec<&Chunk> = chunks
            .iter()
            .filter(|c| c.metadata.get("section") == Some(&json!("Item 1")))
            .collect();
        assert!(!business.is_empty());
        for chunk in business {
            assert_eq!(chunk.metadata.get("section_type"), Some(&json!("business")));
            assert_eq!(chunk.metadata.get("optimal_chunk_size"), Some(&json!(1500)));
            assert_eq!(chunk.metadata.get("optimal_overlap"), Some(&json!(300)));
            assert_eq!(
                chunk.metadata.get("chunking_strategy"),
                Some(&json!("section_aware_Item 1"))
            );
        }
    }

    #[test]
    fn chunk_ids_stay_unique_across_sections() {
        let sections = vec![
            FilingSection::new("Item 1", SectionCategory::Business, long_section("alpha")),
            FilingSection::new("Item 2", SectionCategory::Properties, long_section("beta")),
        ];
        let chunks = chunk_filing_sections(&sections, &Metadata::new()).unwrap();
        let mut ids: Vec<&String> = chunks.iter().map(|c| &c.chunk_id).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before, "chunk ids must not collide across sections");
    }

    #[test]
    fn sections_are_chunked_independently() {
        let sections = vec![FilingSection::new(
            "Item 1A",
            SectionCategory::RiskFactors,
            long_section("risks"),
        )];
        let chunks = chunk_filing_sections(&sections, &Metadata::new()).unwrap();
        for chunk in &chunks {
            assert_eq!(chunk.total_chunks(), Some(chunks.len()));
        }
    }
}
