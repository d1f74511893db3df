//! # Configuration
//!
//! Layered configuration for the collections service:
//!
//! 1. compiled defaults ([`CollectionsConfig::default`])
//! 2. an optional file, `config/collections.{toml,yaml,json}` (or `COLLECTIONS_CONFIG`)
//! 3. environment overrides, `COLLECTIONS__<SECTION>__<KEY>`
//! 4. `DATABASE_URL`
//!
//! ```rust,no_run
//! use collections_core::config::CollectionsConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CollectionsConfig::load()?;
//! println!("chunk size: {}", config.migration.chunk_size);
//! # Ok(())
//! # }
//! ```

use crate::constants::system;
use crate::error::{CollectionsError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "COLLECTIONS";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_CONFIG_PATH: &str = "config/collections";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub migration: MigrationConfig,
    pub streaming: StreamingConfig,
    pub retention: RetentionConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// Database connection settings; without a URL the service runs on the in-memory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

/// Bulk-migration job settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub chunk_size: usize,
    /// Ceiling on concurrently executing chunks, shared by every job
    pub max_concurrent_chunks: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            chunk_size: system::DEFAULT_CHUNK_SIZE,
            max_concurrent_chunks: system::DEFAULT_MAX_CONCURRENT_CHUNKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub poll_interval_ms: u64,
    pub max_stream_lifetime_secs: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: system::DEFAULT_STATUS_POLL_INTERVAL_MS,
            max_stream_lifetime_secs: system::DEFAULT_MAX_STREAM_LIFETIME_SECS,
        }
    }
}

impl StreamingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_stream_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_stream_lifetime_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub job_retention_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            job_retention_secs: system::DEFAULT_JOB_RETENTION_SECS,
            sweep_interval_secs: system::DEFAULT_RETENTION_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RetentionConfig {
    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When disabled, collection pages always read through to the store
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CollectionsConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("COLLECTIONS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load configuration with `path` as the optional file source
    ///
    /// The file extension may be omitted; `config` probes the supported formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading collections configuration");

        let defaults = config::Config::try_from(&CollectionsConfig::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(&path.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let mut config: CollectionsConfig = settings.try_deserialize()?;

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database.url = Some(db_url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the job subsystem cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.migration.chunk_size == 0 {
            return Err(CollectionsError::Configuration(
                "migration.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.migration.max_concurrent_chunks == 0 {
            return Err(CollectionsError::Configuration(
                "migration.max_concurrent_chunks must be greater than zero".to_string(),
            ));
        }
        if self.streaming.poll_interval_ms == 0 {
            return Err(CollectionsError::Configuration(
                "streaming.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.retention.sweep_interval_secs == 0 {
            return Err(CollectionsError::Configuration(
                "retention.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }

        let limit = system::MAX_CONFIGURED_DURATION_SECS;
        let bounded = [
            ("streaming.poll_interval_ms", self.streaming.poll_interval_ms / 1_000),
            (
                "streaming.max_stream_lifetime_secs",
                self.streaming.max_stream_lifetime_secs,
            ),
            ("retention.job_retention_secs", self.retention.job_retention_secs),
            ("retention.sweep_interval_secs", self.retention.sweep_interval_secs),
        ];
        if let Some((name, _)) = bounded.into_iter().find(|(_, secs)| *secs > limit) {
            return Err(CollectionsError::Configuration(format!(
                "{name} must not exceed {limit} seconds"
            )));
        }
        Ok(())
    }
}
