//! Database connection pool management.

use async_trait::async_trait;
use shaku::Component;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::future::Future;
use std::sync::Arc;
use stratum_config::DatabaseConfig;
use stratum_core::{HealthCheck, HealthStatus, Interface, StratumError, StratumResult};
use tracing::{info, warn};

/// Interface for database pool operations.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Pool used for writes, and for reads when no replica is configured.
    fn primary(&self) -> &MySqlPool;

    /// Read replica pool, if one is configured.
    fn replica(&self) -> Option<&MySqlPool>;

    /// Checks if the primary connection is healthy.
    async fn health_check(&self) -> StratumResult<()>;

    /// Runs database migrations against the primary.
    async fn run_migrations(&self) -> StratumResult<()>;

    /// Closes every pool.
    async fn close(&self);
}

/// Primary pool plus optional read replica.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    primary: MySqlPool,
    replica: Option<MySqlPool>,
}

impl DatabasePool {
    /// Connects to the primary and, if configured, the replica.
    pub async fn new(config: &DatabaseConfig) -> StratumResult<Self> {
        info!("Connecting to MySQL primary...");
        let primary = connect(config, &config.url).await?;

        let replica = match &config.replica_url {
            Some(url) => {
                info!("Connecting to MySQL read replica...");
                Some(connect(config, url).await?)
            }
            None => None,
        };

        info!(
            replica = replica.is_some(),
            "MySQL connection pools established"
        );
        Ok(Self { primary, replica })
    }

    /// Wraps pre-existing pools.
    #[must_use]
    pub fn with_pools(primary: MySqlPool, replica: Option<MySqlPool>) -> Self {
        Self { primary, replica }
    }

    /// Returns the parts needed to register this pool with a shaku module.
    #[must_use]
    pub fn into_parameters(self) -> DatabasePoolParameters {
        DatabasePoolParameters {
            primary: self.primary,
            replica: self.replica,
        }
    }
}

async fn connect(config: &DatabaseConfig, url: &str) -> StratumResult<MySqlPool> {
    MySqlPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .connect(url)
        .await
        .map_err(|e| {
            warn!("Failed to connect to database: {}", e);
            StratumError::Database(format!("Failed to connect: {}", e))
        })
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn primary(&self) -> &MySqlPool {
        &self.primary
    }

    fn replica(&self) -> Option<&MySqlPool> {
        self.replica.as_ref()
    }

    async fn health_check(&self) -> StratumResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.primary)
            .await
            .map_err(|e| StratumError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn run_migrations(&self) -> StratumResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.primary)
            .await
            .map_err(|e| StratumError::Database(format!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pools...");
        self.primary.close().await;
        if let Some(replica) = &self.replica {
            replica.close().await;
        }
        info!("Database connection pools closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.primary.size())
            .field("num_idle", &self.primary.num_idle())
            .field("replica", &self.replica.is_some())
            .finish()
    }
}

/// Where a read is allowed to be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadConsistency {
    /// Replica first, primary if the replica fails. May lag behind writes.
    Eventual,
    /// Primary only. Sees every committed write.
    Strong,
}

/// Runs a read with the given consistency.
pub async fn read_with<T, F, Fut>(
    pool: &dyn DatabasePoolInterface,
    consistency: ReadConsistency,
    op: F,
) -> Result<T, sqlx::Error>
where
    F: Fn(MySqlPool) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match consistency {
        ReadConsistency::Strong => op(pool.primary().clone()).await,
        ReadConsistency::Eventual => read_with_fallback(pool, op).await,
    }
}

/// Runs a read against the replica, retrying once on the primary if the
/// replica fails. Without a replica the read goes straight to the primary.
pub async fn read_with_fallback<T, F, Fut>(
    pool: &dyn DatabasePoolInterface,
    op: F,
) -> Result<T, sqlx::Error>
where
    F: Fn(MySqlPool) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let Some(replica) = pool.replica() else {
        return op(pool.primary().clone()).await;
    };

    match op(replica.clone()).await {
        Ok(value) => Ok(value),
        Err(sqlx::Error::RowNotFound) => Err(sqlx::Error::RowNotFound),
        Err(e) => {
            warn!("Replica read failed, falling back to primary: {}", e);
            op(pool.primary().clone()).await
        }
    }
}

/// Health check adapter for the database pool.
pub struct DatabaseHealthCheck {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl DatabaseHealthCheck {
    /// Creates a new database health check.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for DatabaseHealthCheck {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthStatus {
        match self.pool.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}
