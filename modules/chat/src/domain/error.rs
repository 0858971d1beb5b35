use thiserror::Error;
use uuid::Uuid;

use crate::domain::validation::ValidationErrors;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: Uuid },

    /// Signup input rejected by the validator.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Signup passed validation but the store rejected it on a unique index.
    #[error("Conflict on insert: {0}")]
    Conflict(ValidationErrors),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn conversation_not_found(id: Uuid) -> Self {
        Self::ConversationNotFound { id }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn conflict(errors: ValidationErrors) -> Self {
        Self::Conflict(errors)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Field-keyed errors carried by input-related variants.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) | Self::Conflict(errors) => Some(errors),
            Self::ConversationNotFound { .. } | Self::Database { .. } => None,
        }
    }
}
