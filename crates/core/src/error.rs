use std::fmt;

use crate::validation::FieldErrors;

/// Failure reported by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. two submissions racing on
    /// the same new email).
    #[error("Duplicate value violates unique constraint: {constraint}")]
    UniqueViolation { constraint: String },

    /// Any other backend failure (connection loss, FK violation, ...).
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a plain message as a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into().into())
    }
}

/// The step of a submission at which persistence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStep {
    BeginTransaction,
    ResolveSubmitter,
    CreatePereval,
    CreateCoords,
    CreateLevel,
    /// Zero-based position of the image in the payload.
    CreateImage(usize),
    Commit,
}

impl fmt::Display for PersistStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginTransaction => write!(f, "begin transaction"),
            Self::ResolveSubmitter => write!(f, "resolve submitter"),
            Self::CreatePereval => write!(f, "create pereval"),
            Self::CreateCoords => write!(f, "create coords"),
            Self::CreateLevel => write!(f, "create level"),
            Self::CreateImage(index) => write!(f, "create image {index}"),
            Self::Commit => write!(f, "commit transaction"),
        }
    }
}

/// A store failure tagged with the step that produced it.
#[derive(Debug, thiserror::Error)]
#[error("Failed to {step}: {source}")]
pub struct PersistError {
    pub step: PersistStep,
    #[source]
    pub source: StoreError,
}

impl PersistError {
    pub fn new(step: PersistStep, source: StoreError) -> Self {
        Self { step, source }
    }

    /// Build a `map_err` adapter for the given step.
    pub fn at(step: PersistStep) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::new(step, source)
    }
}

/// Outcome of a rejected submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The payload failed structural or type checks. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A store write failed after validation passed. The transaction was
    /// rolled back.
    #[error(transparent)]
    Persistence(#[from] PersistError),
}
