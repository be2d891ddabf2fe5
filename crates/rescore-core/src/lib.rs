//! rescore Core - Domain models, errors, and configuration
//!
//! This crate defines the types shared by every stage of the
//! resume evaluation pipeline:
//! - Skill sets drawn from a reference vocabulary
//! - Evaluation records as persisted by the store
//! - Suitability tiers derived by read-side consumers
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, LoggingConfig, ScoringConfig, SkillsConfig, StoreConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Number of JD characters kept in a record's excerpt
pub const JD_EXCERPT_CHARS: usize = 80;

/// Separator used when a skill set is flattened into a single cell
pub const SKILL_SEPARATOR: &str = ", ";

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for rescore operations
#[derive(Error, Debug)]
pub enum RescoreError {
    #[error("No job description loaded: upload a JD before evaluating resumes")]
    MissingJobDescription,

    #[error("Annotation error: {0}")]
    Annotation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RescoreError>;

// ============================================================================
// Skill Sets
// ============================================================================

/// A set of lowercase canonical skill names.
///
/// Members are lowercased and trimmed on insertion, so membership checks are
/// case-insensitive. Iteration is lexicographic, which keeps the flattened
/// form written to the store stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    /// Create an empty skill set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a skill, normalizing it to lowercase. Blank input is ignored.
    pub fn insert(&mut self, skill: impl AsRef<str>) -> bool {
        let normalized = skill.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        self.0.insert(normalized)
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(&skill.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Skills present in both sets
    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.intersection(&other.0).cloned().collect())
    }

    /// Skills present in `self` but not in `other`
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    /// Skills present in either set
    pub fn union(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.union(&other.0).cloned().collect())
    }

    /// Flatten into a single comma-and-space separated string
    pub fn to_joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(SKILL_SEPARATOR)
    }

    /// Parse a flattened skill list. Empty input yields an empty set.
    pub fn from_joined(joined: &str) -> Self {
        joined.split(',').collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for SkillSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_joined())
    }
}

// ============================================================================
// Job Description
// ============================================================================

/// A loaded job description and the skills it requires
#[derive(Debug, Clone)]
pub struct JobDescription {
    /// Full JD text
    pub text: String,

    /// Skills extracted from the JD
    pub skills: SkillSet,
}

impl JobDescription {
    /// Create a job description, rejecting blank text
    pub fn new(text: impl Into<String>, skills: SkillSet) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RescoreError::MissingJobDescription);
        }
        Ok(Self { text, skills })
    }

    /// Short audit excerpt: the first characters of the JD followed by `...`
    pub fn excerpt(&self) -> String {
        jd_excerpt(&self.text)
    }
}

/// Build the excerpt stored alongside every evaluation
pub fn jd_excerpt(text: &str) -> String {
    let mut excerpt: String = text.chars().take(JD_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

// ============================================================================
// Evaluation Records
// ============================================================================

/// Outcome of scoring one resume against one job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Original file name of the resume
    pub resume_name: String,

    /// Final score in [0, 100], rounded to 2 decimals
    pub score: f64,

    /// JD skills the resume does not mention
    pub missing_skills: SkillSet,

    /// Prefix of the JD text, for display only
    pub jd_excerpt: String,

    /// JD skills the resume mentions
    pub matched_skills: SkillSet,

    /// Best-effort candidate name
    pub candidate_name: Option<String>,

    /// Best-effort candidate phone number
    pub candidate_phone: Option<String>,
}

impl EvaluationRecord {
    /// Create a record with no candidate details
    pub fn new(resume_name: impl Into<String>, score: f64, jd_excerpt: impl Into<String>) -> Self {
        Self {
            resume_name: resume_name.into(),
            score,
            missing_skills: SkillSet::new(),
            jd_excerpt: jd_excerpt.into(),
            matched_skills: SkillSet::new(),
            candidate_name: None,
            candidate_phone: None,
        }
    }

    /// Set matched and missing skills
    pub fn with_skills(mut self, matched: SkillSet, missing: SkillSet) -> Self {
        self.matched_skills = matched;
        self.missing_skills = missing;
        self
    }

    /// Set candidate details
    pub fn with_candidate(mut self, name: Option<String>, phone: Option<String>) -> Self {
        self.candidate_name = name;
        self.candidate_phone = phone;
        self
    }

    /// Suitability tier for this record's score
    pub fn tier(&self) -> SuitabilityTier {
        SuitabilityTier::from_score(self.score)
    }
}

// ============================================================================
// Suitability
// ============================================================================

/// Coarse bucket derived from a final score by read-side consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuitabilityTier {
    High,
    Medium,
    Low,
}

impl SuitabilityTier {
    pub const HIGH_THRESHOLD: f64 = 75.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    /// Every tier, best first
    pub const ALL: [SuitabilityTier; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for SuitabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SuitabilityTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown suitability tier: {other}")),
        }
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Tests
// ============================================================================
