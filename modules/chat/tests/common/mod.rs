//! Shared fixtures: in-memory database, service wiring, and row seeding.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use chat::{
    contract::model::SignupForm,
    domain::service::{Service, ServiceConfig},
    infra::storage::{
        entity::{conversation, conversation_message, conversation_user, user},
        migrations::Migrator,
        sea_orm_repo::{SeaOrmConversationsRepository, SeaOrmUsersRepository},
    },
};

/// Fresh in-memory SQLite database with migrations applied.
/// A single pooled connection keeps every query on the same database.
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Domain service backed by SeaORM repositories on `db`.
pub fn create_service(db: &DatabaseConnection, config: ServiceConfig) -> Arc<Service> {
    Arc::new(Service::new(
        Arc::new(SeaOrmUsersRepository::new(db.clone())),
        Arc::new(SeaOrmConversationsRepository::new(db.clone())),
        config,
    ))
}

pub fn form(username: &str, email: &str, password: &str) -> SignupForm {
    SignupForm {
        username: Some(username.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    }
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Insert a plain (non-privileged) user row directly.
pub async fn seed_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        is_staff: Set(false),
        is_superuser: Set(false),
        is_active: Set(true),
        date_joined: Set(at(0)),
    }
    .insert(db)
    .await
    .expect("seed user")
}

pub async fn seed_conversation(
    db: &DatabaseConnection,
    members: &[&user::Model],
    modified_at: DateTime<Utc>,
) -> conversation::Model {
    let conv = conversation::ActiveModel {
        id: Set(Uuid::new_v4()),
        modified_at: Set(modified_at),
    }
    .insert(db)
    .await
    .expect("seed conversation");

    for member in members {
        conversation_user::ActiveModel {
            conversation_id: Set(conv.id),
            user_id: Set(member.id),
        }
        .insert(db)
        .await
        .expect("seed conversation member");
    }
    conv
}

pub async fn seed_message(
    db: &DatabaseConnection,
    conv: &conversation::Model,
    from: &user::Model,
    to: &user::Model,
    body: &str,
    created_at: DateTime<Utc>,
) -> conversation_message::Model {
    conversation_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(conv.id),
        body: Set(body.to_string()),
        sent_to_id: Set(to.id),
        created_by_id: Set(from.id),
        created_at: Set(created_at),
    }
    .insert(db)
    .await
    .expect("seed message")
}
