use crate::config::env_or;
use crate::core::{AppError, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub max_connections: u32,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| AppError::Configuration("DATABASE_URL not set".to_string()))?,
            pool_size: env_or("DATABASE_POOL_SIZE", 5)?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 20)?,
            run_migrations: env_or("DATABASE_RUN_MIGRATIONS", false)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 || self.pool_size > self.max_connections {
            return Err(AppError::Configuration(format!(
                "Invalid pool bounds: min {} / max {}",
                self.pool_size, self.max_connections
            )));
        }
        Ok(())
    }

    /// Create a MySQL connection pool
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // 30 minutes
            .test_before_acquire(true)
            .connect(&self.url)
            .await?;

        Ok(pool)
    }
}
