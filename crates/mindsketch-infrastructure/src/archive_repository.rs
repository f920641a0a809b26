//! JSON-file-backed ArchiveRepository implementation.
//!
//! The archive is a single ordered JSON list of analysis results, most
//! recent first, capped at `ARCHIVE_CAPACITY`. The file survives process
//! restarts within the same device/profile; it is not shared across devices
//! or users.

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use mindsketch_core::analysis::AnalysisResult;
use mindsketch_core::archive::{ARCHIVE_CAPACITY, ArchiveRepository};
use mindsketch_core::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File layout:
///
/// ```text
/// base_dir/
/// └── history.json    # ordered list, most recent first, length <= 20
/// ```
pub struct JsonArchiveRepository {
    history_path: PathBuf,
}

impl JsonArchiveRepository {
    /// Creates a repository at the default location
    /// (`~/.config/mindsketch/history.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    /// or created.
    pub async fn default_location() -> AnyResult<Self> {
        use crate::paths::SketchPaths;
        let paths = SketchPaths::resolve()
            .map_err(|e| anyhow::anyhow!("Failed to resolve config directory: {}", e))?;
        Self::new(paths.history_file()).await
    }

    /// Creates a repository over an explicit history file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub async fn new(history_path: impl AsRef<Path>) -> AnyResult<Self> {
        let history_path = history_path.as_ref().to_path_buf();
        if let Some(parent) = history_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create archive directory")?;
        }
        Ok(Self { history_path })
    }

    async fn load(&self) -> Result<Vec<AnalysisResult>> {
        if !fs::try_exists(&self.history_path).await? {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.history_path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries = serde_json::from_str(&content)?;
        Ok(entries)
    }

    async fn store(&self, entries: &[AnalysisResult]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.history_path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ArchiveRepository for JsonArchiveRepository {
    async fn save(&self, result: &AnalysisResult) -> Result<()> {
        let mut entries = self.load().await?;
        entries.insert(0, result.clone());
        if entries.len() > ARCHIVE_CAPACITY {
            let evicted = entries.len() - ARCHIVE_CAPACITY;
            entries.truncate(ARCHIVE_CAPACITY);
            tracing::debug!(evicted, "archive over capacity, oldest entries dropped");
        }
        self.store(&entries).await
    }

    async fn list_all(&self) -> Result<Vec<AnalysisResult>> {
        self.load().await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisResult>> {
        let entries = self.load().await?;
        Ok(entries.into_iter().find(|entry| entry.id == id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            // Idempotent: deleting a missing id is a no-op.
            return Ok(());
        }
        self.store(&entries).await
    }
}
