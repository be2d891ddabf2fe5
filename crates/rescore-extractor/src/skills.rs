//! Skill extraction against a reference vocabulary
//!
//! A skill is present when either the annotator tags a span whose text is
//! exactly the skill phrase, or the phrase appears as a substring of the
//! lowercased text. Matching is exact: no stemming, no synonyms.

use tracing::{debug, warn};

use crate::ner::GazetteerAnnotator;
use crate::EntityAnnotator;
use rescore_core::{Result, SkillSet, SkillsConfig};

/// Extracts known skills from free text
pub struct SkillExtractor {
    /// Normalized vocabulary, in configuration order
    vocabulary: Vec<String>,
    /// Optional annotation pass
    annotator: Option<Box<dyn EntityAnnotator>>,
}

impl SkillExtractor {
    /// Substring-only extractor over a vocabulary
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for skill in vocabulary {
            let skill = skill.as_ref().trim().to_lowercase();
            if !skill.is_empty() && !normalized.contains(&skill) {
                normalized.push(skill);
            }
        }

        Self {
            vocabulary: normalized,
            annotator: None,
        }
    }

    /// Attach an annotation service
    pub fn with_annotator(mut self, annotator: impl EntityAnnotator + 'static) -> Self {
        self.annotator = Some(Box::new(annotator));
        self
    }

    /// Build from configuration with a gazetteer annotator over the same
    /// vocabulary
    pub fn from_config(config: &SkillsConfig) -> Result<Self> {
        let extractor = Self::new(&config.vocabulary);
        let annotator = GazetteerAnnotator::new(&extractor.vocabulary)?;
        if annotator.is_empty() {
            warn!("Skill vocabulary is empty; hard scores will be 0");
        } else {
            debug!(phrases = annotator.len(), "Built skill gazetteer");
        }
        Ok(extractor.with_annotator(annotator))
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Skills from the vocabulary mentioned in `text`
    pub fn extract(&self, text: &str) -> SkillSet {
        let mut skills = SkillSet::new();
        let lowered = text.to_lowercase();
        if lowered.trim().is_empty() {
            return skills;
        }

        if let Some(annotator) = &self.annotator {
            match annotator.annotate(&lowered) {
                Ok(entities) => {
                    for entity in entities {
                        if self.vocabulary.contains(&entity.text) {
                            skills.insert(&entity.text);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Annotation failed, using substring matching only"),
            }
        }

        for skill in &self.vocabulary {
            if lowered.contains(skill.as_str()) {
                skills.insert(skill);
            }
        }

        debug!(found = skills.len(), vocabulary = self.vocabulary.len(), "Extracted skills");
        skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractedEntity;
    use rescore_core::RescoreError;

    struct FixedAnnotator(Vec<&'static str>);

    impl EntityAnnotator for FixedAnnotator {
        fn annotate(&self, _text: &str) -> Result<Vec<ExtractedEntity>> {
            Ok(self
                .0
                .iter()
                .map(|t| ExtractedEntity {
                    text: t.to_string(),
                    label: "SKILL".to_string(),
                    start: 0,
                    end: t.len(),
                })
                .collect())
        }
    }

    struct FailingAnnotator;

    impl EntityAnnotator for FailingAnnotator {
        fn annotate(&self, _text: &str) -> Result<Vec<ExtractedEntity>> {
            Err(RescoreError::Annotation("model unavailable".to_string()))
        }
    }

    fn default_extractor() -> SkillExtractor {
        SkillExtractor::from_config(&SkillsConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_known_skills_case_insensitively() {
        let skills = default_extractor()
            .extract("Experienced in PYTHON, Power BI and Machine Learning pipelines.");

        assert_eq!(skills.to_joined(), "machine learning, power bi, python");
    }

    #[test]
    fn test_substring_semantics() {
        // "sql" inside "postgresql" still counts
        let skills = default_extractor().extract("PostgreSQL administrator");
        assert!(skills.contains("sql"));
    }

    #[test]
    fn test_no_synonym_resolution() {
        let skills = default_extractor().extract("ML engineer, BI reporting");
        assert!(skills.is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(default_extractor().extract("").is_empty());
        assert!(default_extractor().extract("  \n\t").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let extractor = default_extractor();
        let text = "spark, sql, tableau and data analysis";
        assert_eq!(extractor.extract(text), extractor.extract(text));
    }

    #[test]
    fn test_annotator_hits_outside_vocabulary_are_ignored() {
        let extractor = SkillExtractor::new(["python"]).with_annotator(FixedAnnotator(vec![
            "python", "rust",
        ]));

        let skills = extractor.extract("some text");
        assert_eq!(skills.to_joined(), "python");
    }

    #[test]
    fn test_annotator_failure_falls_back_to_substrings() {
        let extractor = SkillExtractor::new(["sql"]).with_annotator(FailingAnnotator);
        assert_eq!(extractor.extract("SQL reporting").to_joined(), "sql");
    }

    #[test]
    fn test_vocabulary_normalized() {
        let extractor = SkillExtractor::new([" Python ", "python", "", "SQL"]);
        assert_eq!(extractor.vocabulary(), &["python".to_string(), "sql".to_string()]);
    }
}
