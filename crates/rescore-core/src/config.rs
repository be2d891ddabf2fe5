//! rescore Configuration Management
//!
//! Handles configuration from a TOML file and environment variables,
//! with defaults matching the behavior of a fresh installation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Score aggregation weights
    pub scoring: ScoringConfig,

    /// Reference skill vocabulary
    pub skills: SkillsConfig,

    /// Evaluation store location
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store
        if let Some(path) = lookup("RESCORE_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }

        // Scoring weights
        if let Some(weight) = lookup("RESCORE_HARD_WEIGHT") {
            self.scoring.hard_weight = parse_weight("RESCORE_HARD_WEIGHT", weight)?;
        }
        if let Some(weight) = lookup("RESCORE_SEMANTIC_WEIGHT") {
            self.scoring.semantic_weight = parse_weight("RESCORE_SEMANTIC_WEIGHT", weight)?;
        }

        // Vocabulary (comma-separated)
        if let Some(skills) = lookup("RESCORE_SKILLS") {
            self.skills.vocabulary = skills
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(self)
    }

    /// Check values that would make scoring meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("scoring.hard_weight", self.scoring.hard_weight),
            ("scoring.semantic_weight", self.scoring.semantic_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_weight(key: &str, value: String) -> Result<f64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Weights for combining hard (skill) and semantic scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the skill-overlap percentage
    pub hard_weight: f64,

    /// Weight of the TF-IDF similarity percentage
    pub semantic_weight: f64,
}

impl ScoringConfig {
    /// Whether the weights follow the sum-to-one convention
    pub fn weights_sum_to_one(&self) -> bool {
        ((self.hard_weight + self.semantic_weight) - 1.0).abs() < 1e-9
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            hard_weight: 0.7,
            semantic_weight: 0.3,
        }
    }
}

/// Reference skill vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Known skill phrases, matched case-insensitively
    pub vocabulary: Vec<String>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            vocabulary: [
                "python",
                "spark",
                "machine learning",
                "sql",
                "tableau",
                "power bi",
                "data analysis",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Evaluation store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the CSV file holding evaluation records
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("res_eval.csv"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.hard_weight, 0.7);
        assert_eq!(config.scoring.semantic_weight, 0.3);
        assert!(config.scoring.weights_sum_to_one());
        assert_eq!(config.skills.vocabulary.len(), 7);
        assert_eq!(config.store.path, PathBuf::from("res_eval.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .apply_env(env(&[
                ("RESCORE_STORE_PATH", "/tmp/evals.csv"),
                ("RESCORE_HARD_WEIGHT", "0.5"),
                ("RESCORE_SEMANTIC_WEIGHT", "0.5"),
                ("RESCORE_SKILLS", "rust, go , ,kafka"),
                ("LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.store.path, PathBuf::from("/tmp/evals.csv"));
        assert_eq!(config.scoring.hard_weight, 0.5);
        assert_eq!(config.skills.vocabulary, vec!["rust", "go", "kafka"]);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_weight_env() {
        let err = AppConfig::default()
            .apply_env(env(&[("RESCORE_HARD_WEIGHT", "heavy")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut config = AppConfig::default();
        config.scoring.semantic_weight = -0.1;
        assert!(config.validate().is_err());

        config.scoring.semantic_weight = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[scoring]
hard_weight = 0.6
semantic_weight = 0.4

[skills]
vocabulary = ["rust", "kubernetes"]
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scoring.hard_weight, 0.6);
        assert_eq!(config.skills.vocabulary, vec!["rust", "kubernetes"]);
        // Sections absent from the file keep their defaults
        assert_eq!(config.store.path, PathBuf::from("res_eval.csv"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
