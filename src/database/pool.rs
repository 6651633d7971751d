use crate::config::Config;
use crate::error::{Error, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Owned Postgres connection pool.
///
/// Created by [`Database::connect`], brought up to date with
/// [`Database::migrate`], and released with [`Database::shutdown`]. Stores get
/// a clone of the pool through [`Database::pool`]; nothing holds a global handle.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(url)
            .await?;
        info!(max_connections = config.db_max_connections, "database pool ready");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn shutdown(self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
