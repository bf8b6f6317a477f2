//! Repository-layer error taxonomy, mirroring the structured-context style
//! the teacher's persistence layer uses: every variant carries an
//! [`ErrorContext`] so a caller can log or retry without re-parsing a
//! message string.

use thiserror::Error;

/// Structured context attached to every repository error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            entity: entity.into(),
            entity_id: None,
            details: None,
            retryable: false,
        }
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    #[error("not found: {context:?}")]
    NotFound { context: ErrorContext },

    #[error("uniqueness violation: {context:?}")]
    UniquenessViolation { context: ErrorContext },

    #[error("lock unavailable: {context:?}")]
    LockUnavailable { context: ErrorContext },

    #[error("backend unavailable: {context:?}")]
    BackendUnavailable { context: ErrorContext },
}

impl RepositoryError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RepositoryError::NotFound { context }
            | RepositoryError::UniquenessViolation { context }
            | RepositoryError::LockUnavailable { context }
            | RepositoryError::BackendUnavailable { context } => context.retryable,
        }
    }
}
