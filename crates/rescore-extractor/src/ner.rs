//! Rule-based entity annotation
//!
//! `GazetteerAnnotator` tags whole-word occurrences of known phrases using
//! one compiled regex per phrase. It plays the role of a trained entity
//! recognizer for the skill extractor: it is built once at startup and
//! handed to the extractor, so a bad gazetteer fails at construction rather
//! than mid-batch.

use regex::Regex;

use crate::{EntityAnnotator, ExtractedEntity};
use rescore_core::{RescoreError, Result};

/// Label attached to skill spans
pub const SKILL_LABEL: &str = "SKILL";

/// Dictionary-driven annotator
pub struct GazetteerAnnotator {
    /// Compiled matcher per phrase
    patterns: Vec<Regex>,
}

impl GazetteerAnnotator {
    /// Compile a gazetteer of phrases, labelling matches as skills
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim();
            if phrase.is_empty() {
                continue;
            }
            let regex = Regex::new(&Self::phrase_pattern(phrase)).map_err(|e| {
                RescoreError::Annotation(format!("invalid gazetteer phrase {phrase:?}: {e}"))
            })?;
            patterns.push(regex);
        }

        Ok(Self { patterns })
    }

    /// Number of phrases in the gazetteer
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Case-insensitive, whole-word pattern for a phrase.
    ///
    /// Word boundaries are only asserted next to word characters, so phrases
    /// such as `c++` still match.
    fn phrase_pattern(phrase: &str) -> String {
        let starts_word = phrase.chars().next().is_some_and(is_word_char);
        let ends_word = phrase.chars().last().is_some_and(is_word_char);

        format!(
            "(?i){}{}{}",
            if starts_word { r"\b" } else { "" },
            regex::escape(phrase),
            if ends_word { r"\b" } else { "" },
        )
    }

    /// Drop overlapping spans, preferring the earliest then the longest
    fn remove_overlaps(mut entities: Vec<ExtractedEntity>) -> Vec<ExtractedEntity> {
        entities.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut result: Vec<ExtractedEntity> = Vec::with_capacity(entities.len());
        let mut covered_until = 0;

        for entity in entities {
            if entity.start >= covered_until {
                covered_until = entity.end;
                result.push(entity);
            }
        }

        result
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl EntityAnnotator for GazetteerAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        let mut entities = Vec::new();

        for regex in &self.patterns {
            for mat in regex.find_iter(text) {
                entities.push(ExtractedEntity {
                    text: mat.as_str().to_string(),
                    label: SKILL_LABEL.to_string(),
                    start: mat.start(),
                    end: mat.end(),
                });
            }
        }

        Ok(Self::remove_overlaps(entities))
    }
}
