//! Error types for MailGuard

use crate::Label;
use thiserror::Error;

/// MailGuard error type
#[derive(Error, Debug)]
pub enum MailGuardError {
    /// Both subject and body were empty after stripping
    #[error("empty input: both subject and body are empty after stripping")]
    EmptyInput,

    /// Artifact dimensions disagree with the vectorization schema
    #[error("vocabulary mismatch: classifier expects {expected} features, extractor produces {found}")]
    VocabularyMismatch {
        /// Input dimension the stored classifier was fitted with
        expected: usize,
        /// Dimension the vectorization schema produces
        found: usize,
    },

    /// Artifact was produced by an incompatible pipeline version
    #[error("schema mismatch: artifact has version {found}, this build expects {expected}")]
    SchemaMismatch {
        /// Version this build reads and writes
        expected: u32,
        /// Version found in the artifact
        found: u32,
    },

    /// A label class has too few examples to train on
    #[error("insufficient data: {count} {label} example(s), need at least {min}")]
    InsufficientData {
        /// The underrepresented class
        label: Label,
        /// Examples present for that class
        count: usize,
        /// Configured minimum per class
        min: usize,
    },

    /// No model has been committed to the serving handle yet
    #[error("no active model: train and commit a model before analyzing")]
    NoActiveModel,

    /// Artifact serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for MailGuard
pub type MailGuardResult<T> = Result<T, MailGuardError>;
