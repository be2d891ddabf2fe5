//! rescore Extractor - Scoring engine
//!
//! Turns raw JD and resume text into the pieces of an evaluation record:
//! - Skill extraction against a reference vocabulary, enriched by an
//!   injected entity annotator
//! - TF-IDF cosine similarity between two documents
//! - Weighted aggregation of skill overlap and similarity
//! - Best-effort candidate name and phone extraction

use rescore_core::Result;

/// A labelled span found by an annotator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Trait for text annotation services that tag entity spans
pub trait EntityAnnotator: Send + Sync {
    fn annotate(&self, text: &str) -> Result<Vec<ExtractedEntity>>;
}

pub mod candidate;
pub mod ner;
pub mod scoring;
pub mod similarity;
pub mod skills;
mod stop_words;

pub use candidate::{candidate_initials, extract_candidate_info, CandidateInfo};
pub use ner::{GazetteerAnnotator, SKILL_LABEL};
pub use scoring::{final_score, ScoreBreakdown, ScoreWeights, SkillGap};
pub use similarity::{similarity, TfIdfSimilarity};
pub use skills::SkillExtractor;
