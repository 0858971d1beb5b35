use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    ConversationSummaryDto, CreatedUserDto, MessageDetailDto, PageQuery, SignupReq,
};
use crate::api::rest::error::{bad_request, map_domain_error};
use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Rejected input is logged at info. Database failures are logged by `map_domain_error`.
fn log_failure(op: &str, e: &DomainError) {
    if e.field_errors().is_some() {
        info!(error = %e, "{op} rejected");
    } else {
        debug!(error = %e, "{op} failed");
    }
}

/// Create a superuser account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    operation_id = "chat.create_superuser",
    description = "Validate signup fields and create an account with superuser and staff rights.",
    request_body = SignupReq,
    responses(
        (status = 201, description = "Created superuser", body = CreatedUserDto),
        (status = 400, description = "Field-keyed validation errors", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Concurrent signup took the username or email", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_superuser(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<SignupReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUserDto>), ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| bad_request(r.body_text(), uri.path()))?;
    info!("Creating superuser: {:?}", req_body);

    match svc.create_superuser(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(CreatedUserDto::from(user)))),
        Err(e) => {
            log_failure("Superuser creation", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List conversations, most recently modified first
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "conversations",
    operation_id = "chat.list_conversations",
    params(PageQuery),
    responses(
        (status = 200, description = "List of conversations", body = [ConversationSummaryDto]),
        (status = 400, description = "Malformed path or query", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_conversations(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<ConversationSummaryDto>>, ProblemResponse> {
    let Query(query) = query.map_err(|r| bad_request(r.body_text(), uri.path()))?;
    info!("Listing conversations with query: {:?}", query);

    match svc.list_conversations(query.limit, query.offset).await {
        Ok(conversations) => Ok(Json(
            conversations
                .into_iter()
                .map(ConversationSummaryDto::from)
                .collect(),
        )),
        Err(e) => {
            log_failure("Conversation listing", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific conversation by ID
#[utoipa::path(
    get,
    path = "/conversations/{id}",
    tag = "conversations",
    operation_id = "chat.get_conversation",
    params(("id" = Uuid, Path, description = "Conversation UUID")),
    responses(
        (status = 200, description = "Conversation found", body = ConversationSummaryDto),
        (status = 400, description = "Malformed path or query", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_conversation(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ConversationSummaryDto>, ProblemResponse> {
    let Path(id) = id.map_err(|r| bad_request(r.body_text(), uri.path()))?;
    info!("Getting conversation with id: {}", id);

    match svc.get_conversation(id).await {
        Ok(conversation) => Ok(Json(ConversationSummaryDto::from(conversation))),
        Err(e) => {
            log_failure("Conversation lookup", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List the messages of a conversation, oldest first
#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    tag = "conversations",
    operation_id = "chat.list_messages",
    params(("id" = Uuid, Path, description = "Conversation UUID"), PageQuery),
    responses(
        (status = 200, description = "Messages of the conversation", body = [MessageDetailDto]),
        (status = 400, description = "Malformed path or query", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_messages(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageDetailDto>>, ProblemResponse> {
    let Path(id) = id.map_err(|r| bad_request(r.body_text(), uri.path()))?;
    let Query(query) = query.map_err(|r| bad_request(r.body_text(), uri.path()))?;
    info!("Listing messages of conversation {} with query: {:?}", id, query);

    match svc.list_messages(id, query.limit, query.offset).await {
        Ok(messages) => Ok(Json(
            messages.into_iter().map(MessageDetailDto::from).collect(),
        )),
        Err(e) => {
            log_failure("Message listing", &e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
