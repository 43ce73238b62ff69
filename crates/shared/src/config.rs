//! Configuration management for the anime-universe core.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Metadata catalog (Jikan) settings
    pub catalog: CatalogConfig,

    /// Streaming source (AniLibria) settings
    #[serde(default)]
    pub source: SourceConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Metadata catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Request pacing settings
    pub pacing: PacingConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// Request pacing configuration
///
/// The scheduler issues at most one request per `min_interval_ms` and
/// backs off by `backoff_factor` when the upstream answers 429.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum gap between issued requests in milliseconds
    pub min_interval_ms: u64,

    /// Multiplier applied to the pacing gap before a rate-limit retry
    pub backoff_factor: u32,

    /// Maximum rate-limit retries before surfacing the failure
    pub max_retries: u32,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for cached responses in seconds
    pub ttl_seconds: u64,

    /// Snapshot file name (relative to data directory)
    pub snapshot_file: String,

    /// Schema version tag; snapshots from a different version are discarded
    pub schema_version: u32,
}

/// Streaming source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// AniLibria API base URL
    pub base_url: String,

    /// CDN host prefixed to relative stream paths
    pub cdn_host: String,

    /// Maximum candidates requested per search
    pub search_limit: u32,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anilibria.tv/v3".to_string(),
            cdn_host: "https://cache.libria.fun".to_string(),
            search_limit: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            catalog: CatalogConfig {
                base_url: "https://api.jikan.moe/v4".to_string(),
                request_timeout_secs: 30,
                pacing: PacingConfig {
                    min_interval_ms: 1000,
                    backoff_factor: 2,
                    max_retries: 3,
                },
                cache: CacheConfig {
                    ttl_seconds: 1800,
                    snapshot_file: "catalog-cache.json".to_string(),
                    schema_version: 1,
                },
            },
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }

    /// Get the absolute path for the cache snapshot file
    pub fn cache_snapshot_path(&self) -> PathBuf {
        let snapshot_path = Path::new(&self.catalog.cache.snapshot_file);
        if snapshot_path.is_absolute() {
            snapshot_path.to_path_buf()
        } else {
            self.data_dir().join(snapshot_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.catalog.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.catalog.pacing.min_interval_ms, 1000);
        assert_eq!(config.catalog.pacing.max_retries, 3);
        assert_eq!(config.source.cdn_host, "https://cache.libria.fun");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config::default();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.catalog.base_url, original_config.catalog.base_url);
        assert_eq!(
            loaded_config.source.search_limit,
            original_config.source.search_limit
        );

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));

        let snapshot = config.cache_snapshot_path();
        assert!(snapshot.ends_with("data/catalog-cache.json"));
    }
}
