use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Conversation not found: {id}")]
    NotFound { id: Uuid },

    /// Field name → human-readable reasons.
    #[error("Validation failed for: {}", fields_of(.errors))]
    Validation {
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Username or email was taken between validation and insert.
    #[error("Conflict on: {}", fields_of(.errors))]
    Conflict {
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("Internal error")]
    Internal,
}

fn fields_of(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

impl ChatError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self::Validation { errors }
    }

    pub fn conflict(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self::Conflict { errors }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for ChatError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError;
        match domain_error {
            DomainError::ConversationNotFound { id } => Self::not_found(id),
            DomainError::Validation(errors) => Self::validation(errors.to_messages()),
            DomainError::Conflict(errors) => Self::conflict(errors.to_messages()),
            DomainError::Database { .. } => Self::internal(),
        }
    }
}
