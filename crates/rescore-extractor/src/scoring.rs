//! Final score aggregation
//!
//! `final = hard_weight * hard + semantic_weight * semantic`, where `hard` is
//! the percentage of JD skills found in the resume. A JD with no known skills
//! scores on similarity alone. Results are clamped to [0, 100] and rounded to
//! 2 decimals.

use serde::Serialize;

use rescore_core::{round2, ScoringConfig, SkillSet};

/// Aggregation weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub hard: f64,
    pub semantic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hard: 0.7,
            semantic: 0.3,
        }
    }
}

impl From<&ScoringConfig> for ScoreWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            hard: config.hard_weight,
            semantic: config.semantic_weight,
        }
    }
}

/// Score components shown alongside the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub hard_score: f64,
    pub semantic_score: f64,
    pub final_score: f64,
}

impl ScoreWeights {
    /// Combined score in [0, 100]
    pub fn final_score(&self, matched: usize, required: usize, semantic_score: f64) -> f64 {
        self.breakdown(matched, required, semantic_score).final_score
    }

    pub fn breakdown(
        &self,
        matched: usize,
        required: usize,
        semantic_score: f64,
    ) -> ScoreBreakdown {
        let hard_score = hard_score(matched, required);
        let semantic_score = clamp_percent(semantic_score);
        let combined = self.hard * hard_score + self.semantic * semantic_score;

        ScoreBreakdown {
            hard_score: round2(hard_score),
            semantic_score,
            final_score: round2(clamp_percent(combined)),
        }
    }
}

/// Combined score with the default 0.7 / 0.3 weights
pub fn final_score(matched: usize, required: usize, semantic_score: f64) -> f64 {
    ScoreWeights::default().final_score(matched, required, semantic_score)
}

fn hard_score(matched: usize, required: usize) -> f64 {
    if required == 0 {
        return 0.0;
    }
    (100.0 * matched as f64 / required as f64).min(100.0)
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Split of JD skills into those a resume covers and those it lacks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillGap {
    pub matched: SkillSet,
    pub missing: SkillSet,
}

impl SkillGap {
    pub fn between(jd_skills: &SkillSet, resume_skills: &SkillSet) -> Self {
        let matched = jd_skills.intersection(resume_skills);
        let missing = jd_skills.difference(&matched);
        Self { matched, missing }
    }

    /// Number of skills the JD asks for
    pub fn required(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_required_skills_is_semantic_only() {
        assert_eq!(final_score(0, 0, 50.0), 15.0);
    }

    #[test]
    fn test_weighted_example() {
        let breakdown = ScoreWeights::default().breakdown(3, 5, 40.0);
        assert_eq!(breakdown.hard_score, 60.0);
        assert_eq!(breakdown.final_score, 54.0);
    }

    #[test]
    fn test_semantic_over_100_clamps() {
        assert_eq!(final_score(5, 5, 250.0), 100.0);
        assert_eq!(final_score(0, 0, f64::NAN), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights::from(&ScoringConfig {
            hard_weight: 0.5,
            semantic_weight: 0.5,
        });
        assert_eq!(weights.final_score(1, 2, 20.0), 35.0);
    }

    #[test]
    fn test_skill_gap() {
        let jd = SkillSet::from_joined("python, sql, tableau");
        let resume = SkillSet::from_joined("python, spark");

        let gap = SkillGap::between(&jd, &resume);
        assert_eq!(gap.matched.to_joined(), "python");
        assert_eq!(gap.missing.to_joined(), "sql, tableau");
        assert_eq!(gap.required(), 3);
    }

    proptest! {
        #[test]
        fn prop_score_in_bounds(
            matched in 0usize..50,
            required in 0usize..50,
            semantic in -1000.0f64..1000.0,
        ) {
            let score = final_score(matched, required, semantic);
            prop_assert!((0.0..=100.0).contains(&score));
        }

        #[test]
        fn prop_gap_partitions_jd(
            jd in proptest::collection::vec("[a-e]", 0..6),
            resume in proptest::collection::vec("[a-e]", 0..6),
        ) {
            let jd: SkillSet = jd.into_iter().collect();
            let resume: SkillSet = resume.into_iter().collect();
            let gap = SkillGap::between(&jd, &resume);

            prop_assert_eq!(gap.matched.union(&gap.missing), jd.clone());
            prop_assert!(gap.matched.intersection(&gap.missing).is_empty());
            prop_assert_eq!(gap.matched, jd.intersection(&resume));
        }
    }
}
