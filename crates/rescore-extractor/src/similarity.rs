//! TF-IDF cosine similarity between two documents
//!
//! The vector space is built from the two documents alone on every call:
//! - tokens are lowercased runs of two or more word characters
//! - English stop words are removed
//! - tf is the raw count, idf is smoothed: `ln((1 + n) / (1 + df)) + 1`
//! - document vectors are L2-normalized, so cosine is a dot product
//!
//! Scores are percentages rounded to 2 decimals.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stop_words::ENGLISH_STOP_WORDS;
use rescore_core::round2;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token regex"));

/// Two-document TF-IDF scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfSimilarity;

impl TfIdfSimilarity {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of `a` and `b` as a percentage in [0, 100]
    pub fn score(&self, a: &str, b: &str) -> f64 {
        round2(self.cosine(a, b) * 100.0).clamp(0.0, 100.0)
    }

    /// Raw cosine similarity in [0, 1]
    pub fn cosine(&self, a: &str, b: &str) -> f64 {
        let counts_a = term_counts(a);
        let counts_b = term_counts(b);
        if counts_a.is_empty() || counts_b.is_empty() {
            return 0.0;
        }

        let idf = smoothed_idf(&[&counts_a, &counts_b]);
        let vec_a = normalized_vector(&counts_a, &idf);
        let vec_b = normalized_vector(&counts_b, &idf);

        vec_a
            .iter()
            .filter_map(|(term, wa)| vec_b.get(term).map(|wb| wa * wb))
            .sum()
    }
}

/// Convenience wrapper over [`TfIdfSimilarity::score`]
pub fn similarity(a: &str, b: &str) -> f64 {
    TfIdfSimilarity.score(a, b)
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| !ENGLISH_STOP_WORDS.contains(token.as_str()))
}

fn term_counts(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

fn smoothed_idf<'a>(docs: &[&'a BTreeMap<String, f64>]) -> HashMap<&'a str, f64> {
    let n = docs.len() as f64;
    let mut df: HashMap<&str, f64> = HashMap::new();
    for doc in docs {
        for term in doc.keys() {
            *df.entry(term.as_str()).or_insert(0.0) += 1.0;
        }
    }

    df.into_iter()
        .map(|(term, df)| (term, ((1.0 + n) / (1.0 + df)).ln() + 1.0))
        .collect()
}

fn normalized_vector<'a>(
    counts: &'a BTreeMap<String, f64>,
    idf: &HashMap<&str, f64>,
) -> HashMap<&'a str, f64> {
    let weighted: HashMap<&str, f64> = counts
        .iter()
        .map(|(term, tf)| (term.as_str(), tf * idf.get(term.as_str()).copied().unwrap_or(1.0)))
        .collect();

    let norm = weighted.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm == 0.0 {
        return weighted;
    }

    weighted.into_iter().map(|(t, w)| (t, w / norm)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents() {
        let text = "Data analyst with Python and SQL reporting experience";
        assert_eq!(similarity(text, text), 100.0);
    }

    #[test]
    fn test_disjoint_documents() {
        assert_eq!(similarity("python developer", "chef kitchen"), 0.0);
    }

    #[test]
    fn test_empty_and_stop_word_only() {
        assert_eq!(similarity("", "python"), 0.0);
        assert_eq!(similarity("python", ""), 0.0);
        assert_eq!(similarity("the and of", "the and of"), 0.0);
    }

    #[test]
    fn test_known_value() {
        // python: idf 1.0, sql/tableau: idf ln(3/2) + 1
        // cosine = 1 / (1 + (ln 1.5 + 1)^2) = 0.3361
        assert_eq!(similarity("python sql", "python tableau"), 33.61);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        assert_eq!(similarity("R C", "R C"), 0.0);
    }

    #[test]
    fn test_symmetric_and_deterministic() {
        let a = "Spark pipelines and machine learning models";
        let b = "Built machine learning models in Python";
        let ab = similarity(a, b);
        assert_eq!(ab, similarity(b, a));
        assert_eq!(ab, similarity(a, b));
        assert!(ab > 0.0 && ab < 100.0);
    }
}
