//! SeaORM entities for the chat tables.
//!
//! Relations are resolved by the repository with explicit `IN` queries, so the
//! entities declare no `Related` impls.

pub mod conversation;
pub mod conversation_message;
pub mod conversation_user;
pub mod user;
