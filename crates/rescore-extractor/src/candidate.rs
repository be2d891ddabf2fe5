//! Best-effort candidate details
//!
//! Name comes from a `Name: First Last` label, or failing that from a short
//! first line (at most 4 words). Phone is the first 10-12 digit run, with an
//! optional country-code prefix. Either may be absent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Name\s*[:\-]\s*(\w+ \w+)").expect("name regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\(?\+?\d{1,3}\)?[-.\s]?)?(\d{10,12})").expect("phone regex"));

/// Longest first line still treated as a name
const MAX_NAME_LINE_WORDS: usize = 4;

/// Name and phone pulled from resume text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
}

pub fn extract_candidate_info(text: &str) -> CandidateInfo {
    CandidateInfo {
        name: extract_name(text),
        phone: PHONE_RE.find(text).map(|m| m.as_str().to_string()),
    }
}

fn extract_name(text: &str) -> Option<String> {
    if let Some(caps) = NAME_RE.captures(text) {
        return Some(caps[1].to_string());
    }

    let first_line = text.trim().lines().next()?.trim();
    let words = first_line.split_whitespace().count();
    (words > 0 && words <= MAX_NAME_LINE_WORDS).then(|| first_line.to_string())
}

/// Up to two uppercase initials, or `NA` when no name is known
pub fn candidate_initials(name: Option<&str>) -> String {
    let initials: String = name
        .unwrap_or_default()
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        "NA".to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_name() {
        let info = extract_candidate_info("Name: John Smith\nSome other content");
        assert_eq!(info.name.as_deref(), Some("John Smith"));
        assert_eq!(info.phone, None);
    }

    #[test]
    fn test_label_is_case_insensitive() {
        let info = extract_candidate_info("Curriculum Vitae of a data person\nNAME - jane doe");
        assert_eq!(info.name.as_deref(), Some("jane doe"));
    }

    #[test]
    fn test_short_first_line_fallback() {
        let info = extract_candidate_info("\nSenior Data Engineer Resume\nExperience...");
        assert_eq!(info.name.as_deref(), Some("Senior Data Engineer Resume"));
    }

    #[test]
    fn test_long_first_line_has_no_name() {
        let info = extract_candidate_info("I am a seasoned engineer with ten years\nMore");
        assert_eq!(info.name, None);
        assert_eq!(extract_candidate_info("   ").name, None);
    }

    #[test]
    fn test_phone_with_country_code() {
        let info = extract_candidate_info("Jane Doe\nPhone: +91 9876543210");
        assert_eq!(info.phone.as_deref(), Some("+91 9876543210"));
    }

    #[test]
    fn test_bare_phone() {
        let info = extract_candidate_info("Jane Doe\ncall 5551234567 anytime");
        assert_eq!(info.phone.as_deref(), Some("5551234567"));

        let info = extract_candidate_info("Jane Doe\nzip 12345");
        assert_eq!(info.phone, None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(candidate_initials(Some("jane doe smith")), "JD");
        assert_eq!(candidate_initials(Some("Prince")), "P");
        assert_eq!(candidate_initials(Some("  ")), "NA");
        assert_eq!(candidate_initials(None), "NA");
    }
}
