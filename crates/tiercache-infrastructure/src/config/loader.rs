//! Configuration loader
//!
//! Handles loading configuration from TOML files, environment variables,
//! and default values, using Figment to merge the layers.

use crate::config::{AppConfig, BusProvider};
use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};
use tiercache_domain::error::{Error, Result};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (if exists)
    /// 3. Environment variables with prefix (e.g., `TIERCACHE_REDIS__HOST`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// First existing default location in the working directory
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME),
        ];

        candidates.into_iter().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Any failure is fatal at startup.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_cache_config(config)?;
    validate_redis_config(config)?;
    validate_executor_config(config)?;
    validate_invalidation_config(config)?;
    Ok(())
}

fn validate_cache_config(config: &AppConfig) -> Result<()> {
    if config.cache.namespace_ttl_secs == 0 {
        return Err(Error::configuration("Namespace TTL cannot be 0"));
    }
    Ok(())
}

fn validate_redis_config(config: &AppConfig) -> Result<()> {
    let redis = &config.redis;
    if config.cache.enabled && redis.endpoint().is_none() {
        return Err(Error::configuration(
            "Redis host or cluster nodes must be set when the cache is enabled",
        ));
    }
    if redis.pool_size == 0 {
        return Err(Error::configuration("Redis pool size cannot be 0"));
    }
    if redis.min_idle > redis.pool_size {
        return Err(Error::configuration(format!(
            "Redis min_idle ({}) cannot exceed pool_size ({})",
            redis.min_idle, redis.pool_size
        )));
    }
    Ok(())
}

fn validate_executor_config(config: &AppConfig) -> Result<()> {
    let executor = &config.executor;
    if executor.core_workers == 0 {
        return Err(Error::configuration("Executor needs at least one core worker"));
    }
    if executor.max_workers < executor.core_workers {
        return Err(Error::configuration(format!(
            "Executor max_workers ({}) cannot be below core_workers ({})",
            executor.max_workers, executor.core_workers
        )));
    }
    if executor.queue_capacity == 0 {
        return Err(Error::configuration("Executor queue capacity cannot be 0"));
    }
    Ok(())
}

fn validate_invalidation_config(config: &AppConfig) -> Result<()> {
    let invalidation = &config.invalidation;
    if !config.cache.second_tier_enabled {
        return Ok(());
    }
    if invalidation.channel.trim().is_empty() {
        return Err(Error::configuration("Invalidation channel cannot be empty"));
    }
    if invalidation.provider == BusProvider::Nats && invalidation.nats_url.is_none() {
        return Err(Error::configuration(
            "NATS URL must be set when the nats invalidation provider is selected",
        ));
    }
    Ok(())
}
