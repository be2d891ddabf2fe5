//! Read-side views over stored records
//!
//! Everything here derives new values from `read_all` output; nothing writes
//! back to the store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;

use serde::Serialize;

use crate::{write_rows, Result};
use rescore_core::{EvaluationRecord, SuitabilityTier};

/// Best record per resume name, highest score first.
///
/// Ties keep the earliest appended record. Scores above 100 from older
/// files are clamped for display.
pub fn deduplicate_best(records: &[EvaluationRecord]) -> Vec<EvaluationRecord> {
    let mut sorted: Vec<&EvaluationRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut best = Vec::new();
    for record in sorted {
        if seen.insert(record.resume_name.as_str()) {
            let mut record = record.clone();
            record.score = record.score.min(100.0);
            best.push(record);
        }
    }
    best
}

/// Search and tier filter
#[derive(Debug, Clone)]
pub struct RecordFilter {
    /// Case-insensitive text matched against resume name, candidate name
    /// and matched skills
    pub query: Option<String>,
    /// Tiers to keep
    pub tiers: Vec<SuitabilityTier>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            query: None,
            tiers: SuitabilityTier::ALL.to_vec(),
        }
    }
}

impl RecordFilter {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.trim().is_empty()).then_some(query);
        self
    }

    /// Restrict to the given tiers; an empty list keeps every tier
    pub fn with_tiers(mut self, tiers: Vec<SuitabilityTier>) -> Self {
        if !tiers.is_empty() {
            self.tiers = tiers;
        }
        self
    }

    pub fn matches(&self, record: &EvaluationRecord) -> bool {
        if !self.tiers.contains(&record.tier()) {
            return false;
        }

        let Some(query) = &self.query else {
            return true;
        };
        let query = query.to_lowercase();

        record.resume_name.to_lowercase().contains(&query)
            || record
                .candidate_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&query))
            || record.matched_skills.to_joined().contains(&query)
    }

    pub fn apply(&self, records: &[EvaluationRecord]) -> Vec<EvaluationRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// How often a skill was missing across candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub count: usize,
}

/// Aggregate statistics over a set of records
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub average_score: Option<f64>,
    pub top_score: Option<f64>,
    pub tier_counts: BTreeMap<SuitabilityTier, usize>,
    /// Most frequently missing first
    pub missing_skills: Vec<SkillFrequency>,
}

impl Summary {
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        let scores = records.iter().map(|r| r.score);

        let average_score = (total > 0).then(|| scores.clone().sum::<f64>() / total as f64);
        let top_score = scores.reduce(f64::max);

        let mut tier_counts = BTreeMap::new();
        for record in records {
            *tier_counts.entry(record.tier()).or_insert(0) += 1;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for skill in records.iter().flat_map(|r| r.missing_skills.iter()) {
            *counts.entry(skill).or_insert(0) += 1;
        }
        let mut missing_skills: Vec<SkillFrequency> = counts
            .into_iter()
            .map(|(skill, count)| SkillFrequency {
                skill: skill.to_string(),
                count,
            })
            .collect();
        missing_skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));

        Self {
            total,
            average_score,
            top_score,
            tier_counts,
            missing_skills,
        }
    }

    /// Skill most candidates lack, a hint for training
    pub fn most_missing(&self) -> Option<&SkillFrequency> {
        self.missing_skills.first()
    }
}

/// Write records with the store header, e.g. for a filtered download
pub fn export_csv<W: Write>(writer: W, records: &[EvaluationRecord]) -> Result<()> {
    write_rows(writer, records, true)
}
