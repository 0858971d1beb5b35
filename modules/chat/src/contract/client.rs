use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::ChatError,
    model::{Conversation, ConversationMessage, SignupForm, User},
};

/// Public API trait for the chat module that other modules can use
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Validate signup fields and create a superuser account
    async fn create_superuser(&self, form: SignupForm) -> Result<User, ChatError>;

    /// List conversations, most recently modified first
    async fn list_conversations(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Conversation>, ChatError>;

    /// Get a conversation by ID
    async fn get_conversation(&self, id: Uuid) -> Result<Conversation, ChatError>;

    /// List the messages of a conversation, oldest first
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ConversationMessage>, ChatError>;
}
