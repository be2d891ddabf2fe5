//! rescore CLI library
//!
//! Hosts the evaluation pipeline so it can be exercised without the binary.

pub mod pipeline;

pub use pipeline::{BatchReport, Evaluation, EvaluationError, Evaluator, ResumeOutcome, Upload};
