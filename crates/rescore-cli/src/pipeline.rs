//! Evaluation pipeline
//!
//! One batch is one JD plus any number of resume uploads. Resumes are
//! processed strictly in order: extract text, score, append to the store.
//! A resume that cannot be read or whose text cannot be extracted is
//! reported and skipped; the rest of the batch still runs. A store failure fails that resume and is
//! reported as such, never silently dropped.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use rescore_core::{AppConfig, EvaluationRecord, JobDescription, RescoreError};
use rescore_extractor::{
    extract_candidate_info, ScoreBreakdown, ScoreWeights, SkillExtractor, SkillGap,
    TfIdfSimilarity,
};
use rescore_parser::{ParserError, ParserRegistry};
use rescore_store::{EvaluationStore, StoreError};

// ============================================================================
// Error Types
// ============================================================================

/// Why a single evaluation did not produce a stored record
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Could not read {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not extract text from {name}")]
    Extraction {
        name: String,
        #[source]
        source: ParserError,
    },

    #[error("Could not store evaluation of {name}")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Core(#[from] RescoreError),
}

// ============================================================================
// Inputs and Outputs
// ============================================================================

/// An uploaded document: its original name and raw bytes
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the upload after its file name
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// A scored and stored resume
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub record: EvaluationRecord,
    pub breakdown: ScoreBreakdown,
}

/// Result for one resume in a batch
#[derive(Debug)]
pub enum ResumeOutcome {
    Evaluated(Evaluation),
    Failed { name: String, error: EvaluationError },
}

/// Outcomes of a batch, in upload order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ResumeOutcome>,
}

impl BatchReport {
    pub fn evaluated(&self) -> impl Iterator<Item = &Evaluation> {
        self.outcomes.iter().filter_map(|o| match o {
            ResumeOutcome::Evaluated(e) => Some(e),
            ResumeOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &EvaluationError)> {
        self.outcomes.iter().filter_map(|o| match o {
            ResumeOutcome::Failed { name, error } => Some((name.as_str(), error)),
            ResumeOutcome::Evaluated(_) => None,
        })
    }

    fn push(&mut self, name: &str, result: Result<Evaluation, EvaluationError>) {
        let outcome = match result {
            Ok(evaluation) => ResumeOutcome::Evaluated(evaluation),
            Err(error) => {
                warn!(resume = %name, error = %error, "Resume evaluation failed");
                ResumeOutcome::Failed {
                    name: name.to_string(),
                    error,
                }
            }
        };
        self.outcomes.push(outcome);
    }

    /// Resumes lost because their record could not be written
    pub fn store_failures(&self) -> usize {
        self.failures()
            .filter(|(_, e)| matches!(e, EvaluationError::Store { .. }))
            .count()
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Runs the extract, score, persist pipeline against one store
pub struct Evaluator<S: EvaluationStore> {
    parsers: ParserRegistry,
    skills: SkillExtractor,
    similarity: TfIdfSimilarity,
    weights: ScoreWeights,
    store: S,
}

impl<S: EvaluationStore> Evaluator<S> {
    /// Build from configuration. Fails if the configuration is invalid or
    /// the skill annotator cannot be constructed.
    pub fn new(config: &AppConfig, store: S) -> rescore_core::Result<Self> {
        config.validate()?;
        if !config.scoring.weights_sum_to_one() {
            warn!(
                hard = config.scoring.hard_weight,
                semantic = config.scoring.semantic_weight,
                "Scoring weights do not sum to 1.0"
            );
        }

        Ok(Self {
            parsers: ParserRegistry::with_defaults(),
            skills: SkillExtractor::from_config(&config.skills)?,
            similarity: TfIdfSimilarity::new(),
            weights: ScoreWeights::from(&config.scoring),
            store,
        })
    }

    /// Replace the document parsers
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the JD for a batch. Blank text is a missing JD.
    pub fn load_job_description(
        &self,
        upload: &Upload,
    ) -> Result<JobDescription, EvaluationError> {
        let doc = self
            .parsers
            .parse_upload(&upload.name, &upload.bytes)
            .map_err(|source| EvaluationError::Extraction {
                name: upload.name.clone(),
                source,
            })?;
        Ok(self.job_description_from_text(doc.content)?)
    }

    pub fn job_description_from_text(
        &self,
        text: impl Into<String>,
    ) -> rescore_core::Result<JobDescription> {
        let text = text.into();
        let skills = self.skills.extract(&text);
        let jd = JobDescription::new(text, skills)?;
        info!(skills = %jd.skills, "Loaded job description");
        Ok(jd)
    }

    /// Score resume text against a JD without persisting anything
    pub fn score_text(
        &self,
        jd: &JobDescription,
        resume_name: &str,
        resume_text: &str,
    ) -> Evaluation {
        let resume_skills = self.skills.extract(resume_text);
        let gap = SkillGap::between(&jd.skills, &resume_skills);
        let semantic = self.similarity.score(&jd.text, resume_text);
        let breakdown = self
            .weights
            .breakdown(gap.matched.len(), gap.required(), semantic);
        let candidate = extract_candidate_info(resume_text);

        let record = EvaluationRecord::new(resume_name, breakdown.final_score, jd.excerpt())
            .with_skills(gap.matched, gap.missing)
            .with_candidate(candidate.name, candidate.phone);

        Evaluation { record, breakdown }
    }

    /// Extract, score and persist one resume
    pub fn evaluate(
        &mut self,
        jd: &JobDescription,
        upload: &Upload,
    ) -> Result<Evaluation, EvaluationError> {
        let doc = self
            .parsers
            .parse_upload(&upload.name, &upload.bytes)
            .map_err(|source| EvaluationError::Extraction {
                name: upload.name.clone(),
                source,
            })?;
        if doc.is_blank() {
            warn!(resume = %upload.name, "No text extracted from resume");
        }
        debug!(
            resume = %upload.name,
            words = doc.word_count(),
            pages = ?doc.page_count,
            "Extracted resume text"
        );

        let evaluation = self.score_text(jd, &upload.name, &doc.content);

        self.store
            .append(&evaluation.record)
            .map_err(|source| EvaluationError::Store {
                name: upload.name.clone(),
                source,
            })?;

        info!(
            resume = %upload.name,
            score = evaluation.record.score,
            matched = evaluation.record.matched_skills.len(),
            missing = evaluation.record.missing_skills.len(),
            "Evaluated resume"
        );
        Ok(evaluation)
    }

    /// Evaluate every upload in order, isolating per-resume failures
    pub fn evaluate_batch(&mut self, jd: &JobDescription, uploads: &[Upload]) -> BatchReport {
        let mut report = BatchReport::default();

        for upload in uploads {
            let result = self.evaluate(jd, upload);
            report.push(&upload.name, result);
        }

        report
    }

    /// Read and evaluate resume files in order. A file that cannot be read
    /// fails on its own, like any other per-resume error.
    pub fn evaluate_files(&mut self, jd: &JobDescription, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();

        for path in paths {
            let result = Upload::from_path(path)
                .map_err(|source| EvaluationError::Read {
                    name: path.display().to_string(),
                    source,
                })
                .and_then(|upload| self.evaluate(jd, &upload));
            report.push(&path.display().to_string(), result);
        }

        report
    }
}
