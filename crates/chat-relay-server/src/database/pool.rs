use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    pub async fn new(config: &DatabaseConfig, url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect(url)
            .await
            .context("Failed to connect to postgres")?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self, dir: &str) -> Result<()> {
        let migrator = sqlx::migrate::Migrator::new(Path::new(dir))
            .await
            .with_context(|| format!("Failed to load migrations from {}", dir))?;

        migrator
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;

        info!("Migrations applied from {}", dir);
        Ok(())
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}
