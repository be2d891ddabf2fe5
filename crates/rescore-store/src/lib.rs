//! rescore Store - Durable evaluation records
//!
//! Records are appended, one row per evaluation, to a CSV file with a fixed
//! header. The store never updates or deletes rows; repeated evaluations of
//! the same resume accumulate, and de-duplication is left to the read views
//! in [`view`].

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use rescore_core::{EvaluationRecord, SkillSet};

pub mod view;

pub use view::{deduplicate_best, export_csv, RecordFilter, SkillFrequency, Summary};

/// Column order of the store file
pub const HEADER: [&str; 7] = [
    "Resume Name",
    "Score",
    "Missing Skills",
    "JD Excerpt",
    "Matched Skills",
    "Candidate Name",
    "Candidate Phone",
];

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the evaluation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on store file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid score {value:?} for resume {resume}")]
    InvalidScore { resume: String, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Store Trait
// ============================================================================

/// Append-only persistence of evaluation records
pub trait EvaluationStore {
    /// Persist one record
    fn append(&mut self, record: &EvaluationRecord) -> Result<()>;

    /// Every record ever appended, oldest first
    fn read_all(&self) -> Result<Vec<EvaluationRecord>>;
}

// ============================================================================
// Row Mapping
// ============================================================================

/// One CSV row, with skill sets flattened into joined strings
#[derive(Debug, Serialize, Deserialize)]
struct StoreRow {
    #[serde(rename = "Resume Name")]
    resume_name: String,
    #[serde(rename = "Score")]
    score: String,
    #[serde(rename = "Missing Skills", default)]
    missing_skills: String,
    #[serde(rename = "JD Excerpt", default)]
    jd_excerpt: String,
    #[serde(rename = "Matched Skills", default)]
    matched_skills: String,
    #[serde(rename = "Candidate Name", default)]
    candidate_name: String,
    #[serde(rename = "Candidate Phone", default)]
    candidate_phone: String,
}

impl From<&EvaluationRecord> for StoreRow {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            resume_name: record.resume_name.clone(),
            score: format_score(record.score),
            missing_skills: record.missing_skills.to_joined(),
            jd_excerpt: record.jd_excerpt.clone(),
            matched_skills: record.matched_skills.to_joined(),
            candidate_name: record.candidate_name.clone().unwrap_or_default(),
            candidate_phone: record.candidate_phone.clone().unwrap_or_default(),
        }
    }
}

impl TryFrom<StoreRow> for EvaluationRecord {
    type Error = StoreError;

    fn try_from(row: StoreRow) -> Result<Self> {
        let score = row
            .score
            .trim()
            .parse::<f64>()
            .map_err(|_| StoreError::InvalidScore {
                resume: row.resume_name.clone(),
                value: row.score.clone(),
            })?;

        Ok(EvaluationRecord {
            resume_name: row.resume_name,
            score,
            missing_skills: SkillSet::from_joined(&row.missing_skills),
            jd_excerpt: row.jd_excerpt,
            matched_skills: SkillSet::from_joined(&row.matched_skills),
            candidate_name: non_empty(row.candidate_name),
            candidate_phone: non_empty(row.candidate_phone),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Scores always carry a decimal point (`54.0`, `72.35`)
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}

/// Write records in store format, optionally preceded by the header row
pub(crate) fn write_rows<W: Write>(
    writer: W,
    records: &[EvaluationRecord],
    header: bool,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    if header {
        wtr.write_record(HEADER)?;
    }
    for record in records {
        wtr.serialize(StoreRow::from(record))?;
    }
    wtr.flush().map_err(|e| StoreError::Csv(e.into()))?;
    Ok(())
}

// ============================================================================
// CSV Store
// ============================================================================

/// Evaluation store backed by a single CSV file
pub struct CsvEvaluationStore {
    path: PathBuf,
}

impl CsvEvaluationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// A missing or empty file still needs its header
    fn needs_header(&self) -> Result<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

impl EvaluationStore for CsvEvaluationStore {
    fn append(&mut self, record: &EvaluationRecord) -> Result<()> {
        let header = self.needs_header()?;

        // Encode first so the row lands in the file with a single write
        let mut buf = Vec::new();
        write_rows(&mut buf, std::slice::from_ref(record), header)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(&buf).map_err(|e| self.io_err(e))?;
        file.flush().map_err(|e| self.io_err(e))?;

        debug!(
            store = %self.path.display(),
            resume = %record.resume_name,
            header,
            "Appended evaluation record"
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<EvaluationRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        reader
            .deserialize::<StoreRow>()
            .map(|row| EvaluationRecord::try_from(row?))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, score: f64) -> EvaluationRecord {
        EvaluationRecord::new(name, score, "Looking for a data analyst...").with_skills(
            SkillSet::from_joined("python, sql"),
            SkillSet::from_joined("tableau"),
        )
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(54.0), "54.0");
        assert_eq!(format_score(72.35), "72.35");
        assert_eq!(format_score(0.0), "0.0");
    }

    #[test]
    fn test_write_rows_layout() {
        let mut buf = Vec::new();
        let rec = record("alice.pdf", 54.0)
            .with_candidate(Some("Alice Smith".to_string()), None);
        write_rows(&mut buf, &[rec], true).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().map(|l| l.split(',').collect::<Vec<_>>());
        assert_eq!(header, Some(HEADER.to_vec()));
        assert_eq!(
            lines.next(),
            Some(concat!(
                "alice.pdf,54.0,tableau,Looking for a data analyst...,",
                "\"python, sql\",Alice Smith,"
            ))
        );
    }

    #[test]
    fn test_row_rejects_bad_score() {
        let row = StoreRow {
            resume_name: "x.pdf".to_string(),
            score: "high".to_string(),
            missing_skills: String::new(),
            jd_excerpt: String::new(),
            matched_skills: String::new(),
            candidate_name: String::new(),
            candidate_phone: String::new(),
        };
        assert!(matches!(
            EvaluationRecord::try_from(row),
            Err(StoreError::InvalidScore { .. })
        ));
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evals.csv");
        let mut store = CsvEvaluationStore::new(&path);

        store.append(&record("a.pdf", 10.0)).unwrap();
        store.append(&record("b.pdf", 20.0)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Resume Name").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_empty_file_gets_header() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut store = CsvEvaluationStore::new(file.path());

        assert!(store.read_all().unwrap().is_empty());
        store.append(&record("a.pdf", 10.0)).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_append_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvEvaluationStore::new(dir.path().join("nope").join("evals.csv"));

        let err = store.append(&record("a.pdf", 10.0)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
