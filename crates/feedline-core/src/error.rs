//! Domain-level error types.

use thiserror::Error;
use validator::ValidationErrors;

/// Domain errors - business logic failures.
///
/// Each variant maps to exactly one HTTP status / GraphQL error code, so
/// both transports stay consistent.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Invalid credentials")]
    Unauthenticated,

    #[error("Not the creator of this post")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Flatten `validator` output into per-field messages.
impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| match &e.message {
                        Some(msg) => format!("{field}: {msg}"),
                        None => format!("{field}: invalid value"),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        messages.sort();
        Self::Validation(messages)
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::Internal("entity vanished mid-query".to_string()),
            RepoError::Constraint(msg) => DomainError::Validation(vec![msg]),
            other => DomainError::Internal(other.to_string()),
        }
    }
}
