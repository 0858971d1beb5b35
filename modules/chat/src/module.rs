use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::ChatConfig;
use crate::contract::client::ChatApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::ChatLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::{SeaOrmConversationsRepository, SeaOrmUsersRepository};

/// Chat module: owns the domain service and exposes it over REST and in-process.
#[derive(Clone)]
pub struct ChatModule {
    service: Arc<Service>,
}

impl ChatModule {
    /// Apply pending schema migrations.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running chat database migrations");
        Migrator::up(db, None).await?;
        info!("Chat database migrations completed successfully");
        Ok(())
    }

    /// Wire repositories (infra) to the domain service (ports).
    pub fn init(db: DatabaseConnection, cfg: &ChatConfig) -> Self {
        info!("Initializing chat module");
        debug!(
            "Loaded chat config: min_password_length={}, default_page_size={}, max_page_size={}",
            cfg.min_password_length, cfg.default_page_size, cfg.max_page_size
        );

        // DatabaseConnection is a cheap cloneable pool handle
        let users = SeaOrmUsersRepository::new(db.clone());
        let conversations = SeaOrmConversationsRepository::new(db);
        let service = Service::new(
            Arc::new(users),
            Arc::new(conversations),
            ServiceConfig::from(cfg),
        );

        Self {
            service: Arc::new(service),
        }
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering chat REST routes");
        let router = routes::register_routes(router, self.service.clone())?;
        info!("Chat REST routes registered successfully");
        Ok(router)
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn ChatApi> {
        Arc::new(ChatLocalClient::new(self.service.clone()))
    }
}
