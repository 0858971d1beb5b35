//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both repositories are generic over `C: ConnectionTrait`, so they can be
//! constructed with a `DatabaseConnection` or a transactional connection.

use std::collections::{HashMap, HashSet};

use anyhow::Context;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::{Conversation, ConversationMessage, NewUser, User};
use crate::domain::repo::{ConversationsRepository, CreateUserError, UsersRepository};
use crate::infra::security::password::hash_password;
use crate::infra::storage::entity::{conversation, conversation_message, conversation_user, user};
use crate::infra::storage::mapper::{
    conversation_to_contract, message_to_contract, user_to_contract,
};

/// Users repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn create_privileged_user(&self, new_user: NewUser) -> Result<User, CreateUserError> {
        let password_hash = hash_password(&new_user.password)?;

        let m = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            is_staff: Set(true),
            is_superuser: Set(true),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
        };

        match m.insert(&self.conn).await {
            Ok(model) => Ok(user_to_contract(model)),
            Err(e) => Err(classify_insert_error(e)),
        }
    }
}

/// Map unique-index violations on `users` to the field that collided.
fn classify_insert_error(e: DbErr) -> CreateUserError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        debug!(%detail, "Unique constraint violation on user insert");
        if detail.contains("username") {
            return CreateUserError::UsernameTaken;
        }
        if detail.contains("email") {
            return CreateUserError::EmailTaken;
        }
    }
    CreateUserError::Storage(anyhow::Error::new(e).context("insert user failed"))
}

/// Conversations/messages repository impl.
pub struct SeaOrmConversationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmConversationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn users_by_id(&self, ids: Vec<Uuid>) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .order_by_asc(user::Column::Username)
            .all(&self.conn)
            .await
            .context("load users failed")?;
        Ok(rows.into_iter().map(user_to_contract).collect())
    }

    /// Resolve the participants of each conversation, ordered by username.
    async fn with_users(
        &self,
        rows: Vec<conversation::Model>,
    ) -> anyhow::Result<Vec<Conversation>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();
        let links = conversation_user::Entity::find()
            .filter(conversation_user::Column::ConversationId.is_in(ids))
            .all(&self.conn)
            .await
            .context("load conversation participants failed")?;

        let mut members: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for link in &links {
            members
                .entry(link.conversation_id)
                .or_default()
                .insert(link.user_id);
        }

        let user_ids: Vec<Uuid> = links
            .iter()
            .map(|l| l.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users = self.users_by_id(user_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let participants: Vec<User> = members
                    .get(&row.id)
                    .map(|set| {
                        users
                            .iter()
                            .filter(|u| set.contains(&u.id))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                conversation_to_contract(row, participants)
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl<C> ConversationsRepository for SeaOrmConversationsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list_conversations(
        &self,
        limit: u32,
        offset: u32,
    ) -> anyhow::Result<Vec<Conversation>> {
        let rows = conversation::Entity::find()
            .order_by_desc(conversation::Column::ModifiedAt)
            .order_by_asc(conversation::Column::Id)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.conn)
            .await
            .context("list_conversations failed")?;
        self.with_users(rows).await
    }

    async fn find_conversation(&self, id: Uuid) -> anyhow::Result<Option<Conversation>> {
        let Some(row) = conversation::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_conversation failed")?
        else {
            return Ok(None);
        };
        Ok(self.with_users(vec![row]).await?.pop())
    }

    async fn conversation_exists(&self, id: Uuid) -> anyhow::Result<bool> {
        let count = conversation::Entity::find_by_id(id)
            .count(&self.conn)
            .await
            .context("conversation_exists failed")?;
        Ok(count > 0)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> anyhow::Result<Vec<ConversationMessage>> {
        let rows = conversation_message::Entity::find()
            .filter(conversation_message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(conversation_message::Column::CreatedAt)
            .order_by_asc(conversation_message::Column::Id)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.conn)
            .await
            .context("list_messages failed")?;

        let user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|m| [m.sent_to_id, m.created_by_id])
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let users: HashMap<Uuid, User> = self
            .users_by_id(user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        rows.into_iter()
            .map(|row| message_to_contract(row, &users))
            .collect()
    }
}
