use std::path::PathBuf;

use thiserror::Error;

/// A position-level failure. Engine and move failures never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionAnalysisError {
    #[error("Malformed position: {0}")]
    MalformedPosition(String),
    #[error("Position analysis failed: {0}")]
    Internal(String),
    #[error("Position analysis failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown profile `{0}`; options are: quick, standard, deep, exhaustive")]
    UnknownProfile(String),
    #[error("Invalid category weights: {0}")]
    InvalidWeights(String),
    #[error("Invalid tier thresholds for {phase}: need 0 < dubious < good < excellent < brilliant <= 100")]
    InvalidThresholds { phase: String },
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,
    #[error("Unknown engine `{0}`")]
    UnknownEngine(String),
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
