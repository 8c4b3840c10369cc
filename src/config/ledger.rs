use std::str::FromStr;

use crate::config::env_or;
use crate::core::{AppError, DateParsing, Result};
use crate::modules::contracts::FeeStrategy;

/// Where ledger data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    MySql,
    /// Process-local store, lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Configuration(format!(
                "Unknown ledger storage: {}",
                other
            ))),
        }
    }
}

/// Ledger behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerConfig {
    pub storage: StorageBackend,
    pub fee_strategy: FeeStrategy,
    pub date_parsing: DateParsing,
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            storage: env_or("LEDGER_STORAGE", StorageBackend::default())?,
            fee_strategy: env_or("LEDGER_FEE_STRATEGY", FeeStrategy::default())?,
            date_parsing: env_or("LEDGER_DATE_PARSING", DateParsing::default())?,
        })
    }
}
