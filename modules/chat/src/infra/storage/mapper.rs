use std::collections::HashMap;

use anyhow::anyhow;
use uuid::Uuid;

use crate::contract::model::{Conversation, ConversationMessage, User};
use crate::infra::storage::entity::{conversation, conversation_message, user};

/// Convert a user row to the contract model, dropping the password hash.
pub fn user_to_contract(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        is_staff: model.is_staff,
        is_superuser: model.is_superuser,
        is_active: model.is_active,
        date_joined: model.date_joined,
    }
}

pub fn conversation_to_contract(model: conversation::Model, users: Vec<User>) -> Conversation {
    Conversation {
        id: model.id,
        users,
        modified_at: model.modified_at,
    }
}

/// Resolve sender and recipient from `users` (keyed by id).
pub fn message_to_contract(
    model: conversation_message::Model,
    users: &HashMap<Uuid, User>,
) -> anyhow::Result<ConversationMessage> {
    let message_id = model.id;
    let lookup = |id: Uuid| {
        users
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("message {message_id} references missing user {id}"))
    };

    Ok(ConversationMessage {
        id: model.id,
        conversation_id: model.conversation_id,
        sent_to: lookup(model.sent_to_id)?,
        created_by: lookup(model.created_by_id)?,
        body: model.body,
        created_at: model.created_at,
    })
}
