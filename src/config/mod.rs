use crate::core::{AppError, Result};
use std::env;
use std::str::FromStr;

pub mod database;
pub mod ledger;
pub mod server;

pub use database::DatabaseConfig;
pub use ledger::{LedgerConfig, StorageBackend};
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Present when the ledger is stored in MySQL
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    /// Level for the crate's own spans when RUST_LOG is unset
    pub log_level: String,
    /// `LOG_FORMAT=json` switches the log output to one JSON object per line
    pub log_json: bool,
}

impl AppConfig {
    /// Fallback tracing filter used when RUST_LOG is unset
    pub fn log_filter(&self) -> String {
        format!("commission_ledger={},actix_web=info", self.log_level)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let ledger = LedgerConfig::from_env()?;
        let database = match ledger.storage {
            StorageBackend::MySql => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_json: env::var("LOG_FORMAT")
                    .map(|format| format.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database,
            server: ServerConfig::from_env()?,
            ledger,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        match (&self.ledger.storage, &self.database) {
            (StorageBackend::MySql, None) => Err(AppError::Configuration(
                "MySQL storage selected without database settings".to_string(),
            )),
            (_, Some(database)) => database.validate(),
            (StorageBackend::Memory, None) => Ok(()),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        Err(_) => Ok(default),
    }
}
