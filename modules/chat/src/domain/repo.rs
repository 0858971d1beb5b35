use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{Conversation, ConversationMessage, NewUser, User};

/// Why the store refused to create a user.
#[derive(Error, Debug)]
pub enum CreateUserError {
    #[error("username is already taken")]
    UsernameTaken,
    #[error("email is already in use")]
    EmailTaken,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Port for the domain layer: user persistence needed by signup.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Exact-match lookup on username.
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    /// Exact-match lookup on email.
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Persist a superuser account.
    ///
    /// The adapter hashes `new_user.password` before storage and reports unique-index
    /// violations as `UsernameTaken` / `EmailTaken`.
    async fn create_privileged_user(&self, new_user: NewUser) -> Result<User, CreateUserError>;
}

/// Port for the read side: conversations and messages with relations resolved.
#[async_trait]
pub trait ConversationsRepository: Send + Sync {
    /// Page of conversations ordered by `modified_at` descending.
    async fn list_conversations(&self, limit: u32, offset: u32)
        -> anyhow::Result<Vec<Conversation>>;
    async fn find_conversation(&self, id: Uuid) -> anyhow::Result<Option<Conversation>>;
    /// Existence check without resolving participants.
    async fn conversation_exists(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Page of messages of one conversation ordered by `created_at` ascending.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> anyhow::Result<Vec<ConversationMessage>>;
}
