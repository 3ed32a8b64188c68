use std::sync::Arc;

use db::DBService;

pub mod config;
pub mod error;
pub mod routes;

use config::ServerConfig;

/// Shared handler state: the store plus the resolved configuration.
#[derive(Clone)]
pub struct DeploymentImpl {
    db: DBService,
    config: Arc<ServerConfig>,
}

impl DeploymentImpl {
    pub async fn new(config: ServerConfig) -> Result<Self, sqlx::Error> {
        let db_path = utils::assets::database_path(config.database_path.as_deref());
        let db = DBService::new(&db_path).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: DBService, config: ServerConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
