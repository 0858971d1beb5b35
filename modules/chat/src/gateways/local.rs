use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::ChatApi,
    error::ChatError,
    model::{Conversation, ConversationMessage, SignupForm, User},
};
use crate::domain::service::Service;

/// Local implementation of the ChatApi trait that delegates to the domain service
pub struct ChatLocalClient {
    service: Arc<Service>,
}

impl ChatLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ChatApi for ChatLocalClient {
    async fn create_superuser(&self, form: SignupForm) -> Result<User, ChatError> {
        self.service.create_superuser(form).await.map_err(Into::into)
    }

    async fn list_conversations(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Conversation>, ChatError> {
        self.service
            .list_conversations(limit, offset)
            .await
            .map_err(Into::into)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Conversation, ChatError> {
        self.service.get_conversation(id).await.map_err(Into::into)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ConversationMessage>, ChatError> {
        self.service
            .list_messages(conversation_id, limit, offset)
            .await
            .map_err(Into::into)
    }
}
