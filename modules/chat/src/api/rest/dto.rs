use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{Conversation, ConversationMessage, SignupForm, User};

/// Minimal identity projection, nested inside the other projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDetailDto {
    pub id: Uuid,
    pub username: String,
}

/// Conversation projection, shared by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConversationSummaryDto {
    pub id: Uuid,
    pub users: Vec<UserDetailDto>,
    pub modified_at: DateTime<Utc>,
}

/// Message projection with sender and recipient reduced to `UserDetailDto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageDetailDto {
    pub id: Uuid,
    pub body: String,
    pub sent_to: UserDetailDto,
    pub created_by: UserDetailDto,
}

/// REST DTO for signup. Missing fields are reported per field by the validator.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct SignupReq {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(write_only, format = Password)]
    pub password: Option<String>,
}

impl std::fmt::Debug for SignupReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupReq")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Echo of a created account. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Paging query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Maximum number of items to return
    pub limit: Option<u32>,
    /// Number of items to skip
    pub offset: Option<u32>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDetailDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl From<Conversation> for ConversationSummaryDto {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            users: conversation
                .users
                .into_iter()
                .map(UserDetailDto::from)
                .collect(),
            modified_at: conversation.modified_at,
        }
    }
}

impl From<ConversationMessage> for MessageDetailDto {
    fn from(message: ConversationMessage) -> Self {
        Self {
            id: message.id,
            body: message.body,
            sent_to: message.sent_to.into(),
            created_by: message.created_by.into(),
        }
    }
}

impl From<User> for CreatedUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

impl From<SignupReq> for SignupForm {
    fn from(req: SignupReq) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}
