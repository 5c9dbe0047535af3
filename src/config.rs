use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::room::models::OperationLimits;

/// Which key-value backend holds room documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
    /// No store bound; every room action reports storage unavailable
    #[serde(rename = "none")]
    Disabled,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,

    /// Required when `storage_backend` is `postgres`
    pub database_url: Option<String>,

    #[serde(default = "default_max_operations")]
    pub max_operations: usize,

    #[serde(default = "default_retained_operations")]
    pub retained_operations: usize,

    /// Fallback tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables or a `.env` file
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>().map_err(|e| {
            error!("Failed to load configuration: {}", e);
            ConfigError::EnvError(e)
        })?;
        config.validate()?;

        info!(
            storage_backend = ?config.storage_backend,
            port = config.port,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Build from an explicit list of variables, mainly for tests
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retained_operations == 0 {
            return Err(ConfigError::Invalid(
                "RETAINED_OPERATIONS must be at least 1".to_string(),
            ));
        }
        if self.retained_operations > self.max_operations {
            return Err(ConfigError::Invalid(format!(
                "RETAINED_OPERATIONS ({}) must not exceed MAX_OPERATIONS ({})",
                self.retained_operations, self.max_operations
            )));
        }
        if self.storage_backend == StorageBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::Invalid(
                "DATABASE_URL must be set for the postgres backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn operation_limits(&self) -> OperationLimits {
        OperationLimits {
            max_operations: self.max_operations,
            retained_operations: self.retained_operations,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}

fn default_max_operations() -> usize {
    OperationLimits::default().max_operations
}

fn default_retained_operations() -> usize {
    OperationLimits::default().retained_operations
}

fn default_log_filter() -> String {
    "roomsync=debug,tower_http=debug".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
