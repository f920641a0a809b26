//! Secret service implementation.
//!
//! This module provides a service for managing secret configuration (API
//! keys) stored in secret.json.

use crate::paths::SketchPaths;
use anyhow::Result;
use mindsketch_core::config::SecretConfig;
use mindsketch_core::secret::SecretService;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Service for managing secret configuration.
///
/// Reads secret.json once and caches it to avoid repeated file I/O.
///
/// # Example
///
/// ```ignore
/// use mindsketch_infrastructure::SecretServiceImpl;
/// use mindsketch_core::secret::SecretService;
///
/// let service = SecretServiceImpl::default_location()?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Secret config, filled on first successful load.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    /// Path of the secret file.
    secret_path: PathBuf,
}

impl SecretServiceImpl {
    /// Creates a service over the default secret location
    /// (`~/.config/mindsketch/secret.json`), creating a 600-permission
    /// template file if none exists.
    pub fn default_location() -> Result<Self> {
        let paths = SketchPaths::resolve()
            .map_err(|e| anyhow::anyhow!("Failed to resolve config directory: {}", e))?;
        let secret_path = paths
            .ensure_secret_file()
            .map_err(|e| anyhow::anyhow!("Failed to prepare secret file: {}", e))?;
        Ok(Self::new(secret_path))
    }

    /// Creates a service over an explicit secret file path.
    pub fn new(secret_path: impl AsRef<Path>) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            secret_path: secret_path.as_ref().to_path_buf(),
        }
    }

    /// Loads the secrets from the file if not already cached.
    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        {
            let read_lock = self.secrets.read().unwrap();
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        if !self.secret_path.exists() {
            return Err(format!(
                "Secret file not found at: {}",
                self.secret_path.display()
            ));
        }

        let content = std::fs::read_to_string(&self.secret_path).map_err(|e| {
            format!(
                "Failed to read secret file at {}: {}",
                self.secret_path.display(),
                e
            )
        })?;

        let loaded: SecretConfig = serde_json::from_str(&content).map_err(|e| {
            format!(
                "Failed to parse secret file at {}: {}",
                self.secret_path.display(),
                e
            )
        })?;

        let mut write_lock = self.secrets.write().unwrap();
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access. Used after
    /// the user re-registers a key.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.secrets.write().unwrap();
        *write_lock = None;
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.secret_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_loads_gemini_key() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"gemini": {"api_key": "k-123", "model_name": null}}"#)
            .unwrap();
        file.flush().unwrap();

        let service = SecretServiceImpl::new(file.path());
        assert!(service.secret_file_exists().await);
        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini.unwrap().api_key, "k-123");
    }

    #[tokio::test]
    async fn test_missing_file_reports_error_without_secrets() {
        let service = SecretServiceImpl::new("/nonexistent/secret.json");
        assert!(!service.secret_file_exists().await);
        let err = service.load_secrets().await.unwrap_err();
        assert!(err.contains("not found"));
    }

    #[tokio::test]
    async fn test_cache_invalidation_rereads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"gemini": {"api_key": "old"}}"#).unwrap();
        file.flush().unwrap();

        let service = SecretServiceImpl::new(file.path());
        assert_eq!(
            service.load_secrets().await.unwrap().gemini.unwrap().api_key,
            "old"
        );

        std::fs::write(file.path(), r#"{"gemini": {"api_key": "new"}}"#).unwrap();
        // Cached value until invalidated.
        assert_eq!(
            service.load_secrets().await.unwrap().gemini.unwrap().api_key,
            "old"
        );
        service.invalidate_cache();
        assert_eq!(
            service.load_secrets().await.unwrap().gemini.unwrap().api_key,
            "new"
        );
    }
}
