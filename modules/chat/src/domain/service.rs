use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Conversation, ConversationMessage, NewUser, SignupForm, User};
use crate::domain::error::DomainError;
use crate::domain::repo::{ConversationsRepository, CreateUserError, UsersRepository};
use crate::domain::validation::{
    check_email_shape, check_password_differs, check_password_strength, check_username_shape,
    require, Field, FieldError, SignupRules, ValidationErrors,
};

/// Domain service for signup and the conversation read side.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    conversations: Arc<dyn ConversationsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub signup: SignupRules,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            signup: SignupRules::default(),
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        users: Arc<dyn UsersRepository>,
        conversations: Arc<dyn ConversationsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            conversations,
            config,
        }
    }

    /// Validate raw signup fields without creating anything.
    ///
    /// Every field is checked and failures are aggregated; the password/username
    /// comparison runs only when all fields passed on their own.
    #[instrument(name = "chat.service.validate_signup", skip_all)]
    pub async fn validate_signup(&self, form: &SignupForm) -> Result<NewUser, DomainError> {
        let rules = &self.config.signup;
        let mut errors = ValidationErrors::default();

        let username = match require(form.username.as_deref())
            .map(str::trim)
            .and_then(|u| check_username_shape(u, rules).map(|()| u))
        {
            Ok(u) => self
                .unique_or_record(u, Field::Username, &mut errors)
                .await?,
            Err(e) => {
                errors.add(Field::Username, e);
                None
            }
        };

        let email = match require(form.email.as_deref())
            .map(str::trim)
            .and_then(|e| check_email_shape(e, rules).map(|()| e))
        {
            Ok(e) => self.unique_or_record(e, Field::Email, &mut errors).await?,
            Err(e) => {
                errors.add(Field::Email, e);
                None
            }
        };

        let password = match require(form.password.as_deref())
            .map(str::trim)
            .and_then(|p| check_password_strength(p, rules).map(|()| p))
        {
            Ok(p) => Some(p),
            Err(e) => {
                errors.add(Field::Password, e);
                None
            }
        };

        let (Some(username), Some(email), Some(password)) = (username, email, password) else {
            debug!(fields = %errors, "Signup rejected by field rules");
            return Err(DomainError::validation(errors));
        };

        if let Err(e) = check_password_differs(&username, password) {
            debug!("Signup rejected: password matches username");
            return Err(DomainError::validation(ValidationErrors::single(
                Field::Password,
                e,
            )));
        }

        Ok(NewUser {
            username,
            email,
            password: password.to_string(),
        })
    }

    /// Validate signup fields and create the account.
    ///
    /// Accounts created here are superusers (`is_superuser` and `is_staff` set).
    /// This path exists to bootstrap administrators; it must not be repurposed for
    /// ordinary registrations.
    #[instrument(
        name = "chat.service.create_superuser",
        skip_all,
        fields(username = form.username.as_deref().unwrap_or_default())
    )]
    pub async fn create_superuser(&self, form: SignupForm) -> Result<User, DomainError> {
        info!("Creating superuser");

        let new_user = self.validate_signup(&form).await?;

        let user = self
            .users
            .create_privileged_user(new_user)
            .await
            .map_err(|e| match e {
                // A concurrent signup won the race past the existence checks.
                CreateUserError::UsernameTaken => DomainError::conflict(
                    ValidationErrors::single(Field::Username, FieldError::DuplicateUsername),
                ),
                CreateUserError::EmailTaken => DomainError::conflict(ValidationErrors::single(
                    Field::Email,
                    FieldError::DuplicateEmail,
                )),
                CreateUserError::Storage(e) => DomainError::database(format!("{e:#}")),
            })?;

        info!(user_id = %user.id, "Successfully created superuser");
        Ok(user)
    }

    #[instrument(name = "chat.service.list_conversations", skip(self))]
    pub async fn list_conversations(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Conversation>, DomainError> {
        debug!("Listing conversations");

        let (limit, offset) = self.page(limit, offset);
        let conversations = self
            .conversations
            .list_conversations(limit, offset)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        debug!("Successfully listed {} conversations", conversations.len());
        Ok(conversations)
    }

    #[instrument(name = "chat.service.get_conversation", skip(self), fields(conversation_id = %id))]
    pub async fn get_conversation(&self, id: Uuid) -> Result<Conversation, DomainError> {
        debug!("Getting conversation by id");

        self.conversations
            .find_conversation(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::conversation_not_found(id))
    }

    #[instrument(
        name = "chat.service.list_messages",
        skip(self),
        fields(conversation_id = %conversation_id)
    )]
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ConversationMessage>, DomainError> {
        debug!("Listing messages");

        // 404 for unknown conversations rather than an empty page
        let exists = self
            .conversations
            .conversation_exists(conversation_id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        if !exists {
            return Err(DomainError::conversation_not_found(conversation_id));
        }

        let (limit, offset) = self.page(limit, offset);
        let messages = self
            .conversations
            .list_messages(conversation_id, limit, offset)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        debug!("Successfully listed {} messages", messages.len());
        Ok(messages)
    }

    // --- helpers ---

    /// Look the value up in the store; records a duplicate error and yields None if taken.
    async fn unique_or_record(
        &self,
        value: &str,
        field: Field,
        errors: &mut ValidationErrors,
    ) -> Result<Option<String>, DomainError> {
        let (exists, duplicate) = match field {
            Field::Username => (
                self.users.username_exists(value).await,
                FieldError::DuplicateUsername,
            ),
            Field::Email => (
                self.users.email_exists(value).await,
                FieldError::DuplicateEmail,
            ),
            Field::Password => return Ok(Some(value.to_string())),
        };

        if exists.map_err(|e| DomainError::database(format!("{e:#}")))? {
            errors.add(field, duplicate);
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    fn page(&self, limit: Option<u32>, offset: Option<u32>) -> (u32, u32) {
        let limit = limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);
        (limit, offset.unwrap_or(0))
    }
}
