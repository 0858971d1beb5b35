use utoipa::OpenApi;

use crate::api::rest::dto::{
    ConversationSummaryDto, CreatedUserDto, MessageDetailDto, SignupReq, UserDetailDto,
};
use crate::api::rest::problem::Problem;

/// OpenAPI document for the chat REST surface, served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat API",
        description = "Superuser signup and read access to conversations and their messages."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::rest::handlers::create_superuser,
        crate::api::rest::handlers::list_conversations,
        crate::api::rest::handlers::get_conversation,
        crate::api::rest::handlers::list_messages,
    ),
    components(schemas(
        SignupReq,
        CreatedUserDto,
        UserDetailDto,
        ConversationSummaryDto,
        MessageDetailDto,
        Problem,
    )),
    tags(
        (name = "users", description = "Account creation"),
        (name = "conversations", description = "Conversations and their messages")
    )
)]
pub struct ChatApiDoc;
