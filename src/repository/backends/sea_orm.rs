use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::errors::{IpLocatorError, Result};
use crate::repository::{Location, LocationRepository};

use migration::{Migrator, MigratorTrait, entities::ip_location};

#[derive(Clone)]
pub struct SeaOrmRepository {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmRepository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(IpLocatorError::config("DATABASE_URL is not set".to_string()));
        }

        // Connection options differ per backend
        let db = if config.backend == "sqlite" {
            Self::connect_sqlite(&config.database_url).await?
        } else {
            Self::connect_generic(config).await?
        };

        let repository = SeaOrmRepository {
            db,
            backend_name: config.backend.clone(),
        };

        // Run migrations
        repository.run_migrations().await?;

        warn!(
            "{} Repository initialized.",
            repository.backend_name.to_uppercase()
        );
        Ok(repository)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Connect to SQLite (auto-create plus WAL tuning)
    async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::SqlitePool;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| IpLocatorError::config(format!("Failed to parse SQLite URL: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        // sqlx connection pool
        let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
            IpLocatorError::store_error(format!("Failed to connect to SQLite database: {}", e))
        })?;

        // Convert into Sea-ORM's DatabaseConnection
        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// Connect to MySQL/PostgreSQL
    async fn connect_generic(config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(config.database_url.to_owned());
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(std::time::Duration::from_secs(config.timeout))
            .acquire_timeout(std::time::Duration::from_secs(config.timeout))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            IpLocatorError::store_error(format!(
                "Failed to connect to {} database: {}",
                config.backend.to_uppercase(),
                e
            ))
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| IpLocatorError::store_error(format!("Migration failed: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Convert a Sea-ORM model into a Location
    fn model_to_location(model: ip_location::Model) -> Location {
        Location {
            id: model.id,
            ip: model.ip,
            city: model.city,
            region: model.region,
            country: model.country,
            country_code: model.country_code,
            continent: model.continent,
            latitude: model.latitude,
            longitude: model.longitude,
            last_updated: model.last_updated,
        }
    }

    /// Convert a Location into an ActiveModel (for insert/update)
    fn location_to_active_model(
        location: &Location,
        user_id: Option<&str>,
    ) -> ip_location::ActiveModel {
        use sea_orm::ActiveValue::Set;

        ip_location::ActiveModel {
            id: Set(location.id.clone()),
            ip: Set(location.ip.clone()),
            city: Set(location.city.clone()),
            region: Set(location.region.clone()),
            country: Set(location.country.clone()),
            country_code: Set(location.country_code.clone()),
            continent: Set(location.continent.clone()),
            latitude: Set(location.latitude.clone()),
            longitude: Set(location.longitude.clone()),
            last_updated: Set(location.last_updated),
            updated_by: Set(user_id.map(String::from)),
        }
    }
}

#[async_trait]
impl LocationRepository for SeaOrmRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Location>> {
        let model = ip_location::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| IpLocatorError::store_error(format!("Failed to query location: {}", e)))?;

        Ok(model.map(Self::model_to_location))
    }

    async fn create(&self, location: &Location) -> Result<()> {
        let active_model = Self::location_to_active_model(location, None);

        active_model
            .insert(&self.db)
            .await
            .map_err(|e| IpLocatorError::store_error(format!("Failed to insert location: {}", e)))?;

        info!("Location created: {} ({})", location.ip, location.id);
        Ok(())
    }

    async fn update(&self, location: &Location, user_id: Option<&str>) -> Result<()> {
        let active_model = Self::location_to_active_model(location, user_id);

        active_model
            .update(&self.db)
            .await
            .map_err(|e| IpLocatorError::store_error(format!("Failed to update location: {}", e)))?;

        info!("Location updated: {} ({})", location.ip, location.id);
        Ok(())
    }
}
