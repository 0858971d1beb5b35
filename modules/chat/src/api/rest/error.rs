use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Attach the current span id so the response can be matched with logs
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// 400 for input axum could not extract (body, path or query string)
pub fn bad_request(detail: impl Into<String>, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "CHAT_BAD_REQUEST",
        "Bad Request",
        detail,
        instance,
    )
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::ConversationNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "CHAT_CONVERSATION_NOT_FOUND",
            "Conversation not found",
            format!("Conversation with id {} was not found", id),
            instance,
        ),
        DomainError::Validation(errors) => {
            let ProblemResponse(problem) = from_parts(
                StatusCode::BAD_REQUEST,
                "CHAT_VALIDATION",
                "Validation error",
                "One or more fields are invalid",
                instance,
            );
            ProblemResponse(problem.with_errors(errors.to_messages()))
        }
        DomainError::Conflict(errors) => {
            let ProblemResponse(problem) = from_parts(
                StatusCode::CONFLICT,
                "CHAT_USER_CONFLICT",
                "User already exists",
                "Another account was created with the same details",
                instance,
            );
            ProblemResponse(problem.with_errors(errors.to_messages()))
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{Field, FieldError, ValidationErrors};
    use uuid::Uuid;

    #[test]
    fn validation_maps_to_400_with_field_messages() {
        let mut errors = ValidationErrors::default();
        errors.add(Field::Username, FieldError::DuplicateUsername);
        errors.add(Field::Email, FieldError::DuplicateEmail);

        let ProblemResponse(p) = map_domain_error(&DomainError::validation(errors), "/users");
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "CHAT_VALIDATION");
        assert_eq!(p.instance, "/users");
        let errors = p.errors.unwrap();
        assert_eq!(errors["username"], vec!["This username is already taken."]);
        assert_eq!(errors["email"], vec!["This email is already in use."]);
    }

    #[test]
    fn conflict_maps_to_409() {
        let errors = ValidationErrors::single(Field::Username, FieldError::DuplicateUsername);
        let ProblemResponse(p) = map_domain_error(&DomainError::conflict(errors), "/users");
        assert_eq!(p.status, 409);
        assert!(p.errors.unwrap().contains_key("username"));
    }

    #[test]
    fn not_found_and_database() {
        let id = Uuid::nil();
        let ProblemResponse(p) = map_domain_error(
            &DomainError::conversation_not_found(id),
            "/conversations/x",
        );
        assert_eq!(p.status, 404);
        assert!(p.detail.contains(&id.to_string()));

        let ProblemResponse(p) = map_domain_error(&DomainError::database("boom"), "/x");
        assert_eq!(p.status, 500);
        assert!(!p.detail.contains("boom"));
        assert!(p.errors.is_none());
    }
}
