use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::{MemoryUserRepository, PgUserRepository, UserRepository};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Classify driver errors that carry domain meaning
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DatabaseError::UniqueViolation(db.message().to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Repository chosen at startup, plus the pool to close at shutdown
pub struct OpenedStore {
    pub repository: Arc<dyn UserRepository>,
    pub pool: Option<PgPool>,
}

impl OpenedStore {
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            DatabaseManager::close(pool).await;
        }
    }
}

/// Owns the Postgres pool for the lifetime of the server
pub struct DatabaseManager;

impl DatabaseManager {
    /// Scheme that selects the in-process store instead of Postgres
    pub const MEMORY_URL: &'static str = "memory://";

    pub fn is_memory_url(url: &str) -> bool {
        url.starts_with(Self::MEMORY_URL)
    }

    /// Open the store named by `DATABASE_URL`, running migrations when configured
    pub async fn open(config: &DatabaseConfig) -> Result<OpenedStore, DatabaseError> {
        if config.url.as_deref().is_some_and(Self::is_memory_url) {
            info!("Using in-memory user store");
            return Ok(OpenedStore {
                repository: Arc::new(MemoryUserRepository::new()),
                pool: None,
            });
        }

        let pool = Self::connect(config).await?;
        if config.run_migrations {
            Self::migrate(&pool).await?;
        }
        Ok(OpenedStore {
            repository: Arc::new(PgUserRepository::new(pool.clone())),
            pool: Some(pool),
        })
    }

    /// Open the pool described by the config
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(pool)
    }

    /// Apply the embedded migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_memory_url() {
        assert!(DatabaseManager::is_memory_url("memory://"));
        assert!(DatabaseManager::is_memory_url("memory://scratch"));
        assert!(!DatabaseManager::is_memory_url("postgres://localhost/users"));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = DatabaseError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn open_memory_store_has_no_pool() {
        let mut config = crate::config::AppConfig::development().database;
        config.url = Some("memory://".to_string());
        let store = DatabaseManager::open(&config).await.unwrap();
        assert!(store.pool.is_none());
        store.repository.ping().await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    async fn connect_requires_url() {
        let mut config = crate::config::AppConfig::development().database;
        config.url = None;
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }
}
