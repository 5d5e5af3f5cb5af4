//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use stratum_core::StratumError;
use tracing::{debug, info, warn};

/// Loads and validates the layered configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Uncommitted local overrides
    /// 4. Environment variables with `STRATUM__` prefix (e.g. `STRATUM__CACHE__BACKEND`)
    pub fn new(config_dir: impl AsRef<str>) -> Result<Self, StratumError> {
        let config = Self::load_config(config_dir.as_ref())?;
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, StratumError> {
        Self::new("./config")
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, StratumError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("STRATUM_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("STRATUM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_error_to_stratum_error)?;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Validates a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), StratumError> {
    if config.database.url.is_empty() {
        return Err(StratumError::Configuration(
            "Database URL is required".to_string(),
        ));
    }

    if config.cache.item_ttl_secs == 0 || config.cache.list_ttl_secs == 0 {
        return Err(StratumError::Configuration(
            "Cache TTLs must be greater than zero".to_string(),
        ));
    }

    if config.cache.list_ttl_secs > config.cache.item_ttl_secs {
        warn!(
            "List TTL ({}s) exceeds item TTL ({}s); listings will outlive the items they contain",
            config.cache.list_ttl_secs, config.cache.item_ttl_secs
        );
    }

    Ok(())
}

fn config_error_to_stratum_error(err: ConfigError) -> StratumError {
    StratumError::Configuration(err.to_string())
}
