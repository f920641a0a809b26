//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the application
//! configuration from ~/.config/mindsketch/config.toml.

use crate::paths::SketchPaths;
use mindsketch_core::config::AppConfig;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the application configuration.
///
/// Missing file or unreadable content falls back to `AppConfig::default()`;
/// configuration problems never block the flow.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Configuration, filled on first access.
    config: Arc<RwLock<Option<AppConfig>>>,
    /// Explicit config path override (tests); default path otherwise.
    config_path: Option<PathBuf>,
}

impl ConfigService {
    /// Creates a new ConfigService over the default config location.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            config_path: None,
        }
    }

    /// Creates a ConfigService over an explicit config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            config_path: Some(path.into()),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> AppConfig {
        {
            let read_lock = self.config.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default configuration: {}", e);
            AppConfig::default()
        });

        let mut write_lock = self.config.write().unwrap();
        *write_lock = Some(loaded.clone());

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap();
        *write_lock = None;
    }

    fn load_config(&self) -> Result<AppConfig, String> {
        let config_path = match &self.config_path {
            Some(path) => path.clone(),
            None => SketchPaths::resolve()
                .map_err(|e| e.to_string())?
                .config_file(),
        };

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file at {:?}: {}", config_path, e))?;

        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse TOML from {:?}: {}", config_path, e))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
