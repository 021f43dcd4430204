pub mod migrations;
pub mod models;
pub mod pool;
pub mod repositories;

pub use models::*;
pub use pool::{create_pool, DbPool};
pub use repositories::{InMemoryUserRepository, PgUserRepository};

use anyhow::Result;
use std::sync::Arc;

/// Database service combining all repositories
pub struct Database {
    pub users: Arc<PgUserRepository>,
    pool: DbPool,
}

impl Database {
    /// Create a new database service from a connection pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new database service from configuration
    pub async fn from_config(config: &config::DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::new(pool))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run(&self.pool).await
    }
}
