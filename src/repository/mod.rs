use std::sync::Arc;

use tracing::error;

use crate::config::DatabaseConfig;
use crate::errors::{IpLocatorError, Result};

pub mod backends;
pub mod models;

pub use models::{Location, UNKNOWN_MARKER};

/// Persistent store collaborator
///
/// Locations are keyed by id (the IP hash). The implementation provides
/// its own consistency; the resolution pipeline treats this as a plain
/// get/create/update repository.
#[async_trait::async_trait]
pub trait LocationRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Location>>;
    async fn create(&self, location: &Location) -> Result<()>;

    /// Overwrite an existing record; `user_id` lands in the audit column
    async fn update(&self, location: &Location, user_id: Option<&str>) -> Result<()>;
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn LocationRepository>> {
        match config.backend.as_str() {
            "sqlite" | "mysql" | "postgres" | "mariadb" => {
                let repository = backends::sea_orm::SeaOrmRepository::new(config).await?;
                Ok(Arc::new(repository) as Arc<dyn LocationRepository>)
            }
            other => {
                error!("Unknown repository backend: {}", other);
                Err(IpLocatorError::config(format!(
                    "Unknown repository backend: {}. Supported: sqlite, mysql, postgres, mariadb",
                    other
                )))
            }
        }
    }
}
