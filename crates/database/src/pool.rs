use config::DatabaseConfig;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::NoTls;
use tracing::info;

/// Connection pool type alias
pub type DbPool = Pool;

/// Create a connection pool from configuration and verify it with a round trip.
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.database.clone());
    cfg.user = Some(config.username.clone());
    cfg.password = Some(config.password.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(deadpool_postgres::PoolConfig::new(config.max_connections));

    let pool = if config.tls_enabled {
        let connector = native_tls::TlsConnector::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build TLS connector: {e}"))?;
        cfg.create_pool(Some(Runtime::Tokio1), MakeTlsConnector::new(connector))
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
    }
    .map_err(|e| anyhow::anyhow!("Failed to create pool: {e}"))?;

    info!(
        "Database connection pool created: {}:{}/{} (tls: {})",
        config.host, config.port, config.database, config.tls_enabled
    );

    let client = pool
        .get()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get connection from pool: {e}"))?;

    client
        .simple_query("SELECT 1")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to test database connection: {e}"))?;
    info!("Database connection test successful");

    Ok(pool)
}
