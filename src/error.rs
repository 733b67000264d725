//! Error handling for the talent matcher

use std::fmt;
use thiserror::Error;

/// Kind of catalog entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    Project,
    Course,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Employee => "employee",
            EntityKind::Project => "project",
            EntityKind::Course => "course",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum TalentMatcherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding dimensions don't match: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown {kind} id: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Dependency failure during {operation} ({target}): {source}")]
    DependencyFailure {
        operation: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TalentMatcherError>;

impl TalentMatcherError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        TalentMatcherError::NotFound { kind, id: id.into() }
    }

    /// Wrap a collaborator failure with the operation and target that raised it.
    pub fn dependency(
        operation: &'static str,
        target: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        TalentMatcherError::DependencyFailure {
            operation,
            target: target.into(),
            source,
        }
    }

    /// True for errors a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TalentMatcherError::DependencyFailure { .. })
    }
}
