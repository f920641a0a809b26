//! Locations of the on-disk state.
//!
//! Everything MindSketch persists (settings, the API key, the archived
//! history) sits under one per-platform config directory:
//!
//! ```text
//! ~/.config/mindsketch/
//! ├── config.toml      # application settings
//! ├── secret.json      # API key (0600)
//! ├── history.json     # archived analysis results
//! └── logs/
//! ```

use mindsketch_core::config::{DEFAULT_ANALYSIS_MODEL, GeminiConfig, SecretConfig};
use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// The resolved set of MindSketch file locations.
///
/// An instance pins the base directory once, so services built from the same
/// `SketchPaths` agree on where state lives. Tests point it at a temporary
/// directory via [`SketchPaths::at`].
#[derive(Debug, Clone)]
pub struct SketchPaths {
    base: PathBuf,
}

impl SketchPaths {
    /// Resolves the per-platform default base directory
    /// (`~/.config/mindsketch` on Linux).
    pub fn resolve() -> Result<Self, PathError> {
        let base = dirs::config_dir()
            .ok_or(PathError::HomeDirNotFound)?
            .join("mindsketch");
        Ok(Self { base })
    }

    /// Pins the base directory explicitly.
    pub fn at(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base config directory.
    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    /// `config.toml` — application settings.
    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// `secret.json` — the API key. Keep permissions at 0600.
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    /// `history.json` — the archived analysis results.
    pub fn history_file(&self) -> PathBuf {
        self.base.join("history.json")
    }

    /// `logs/` — log output of the embedding application.
    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    /// Returns the secret file path, writing a blank-key template on first
    /// use so the user has something to fill in.
    ///
    /// On Unix the template is chmod'ed to 0600 before this returns.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.base)?;

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_ANALYSIS_MODEL.to_string()),
            }),
        };
        let json = serde_json::to_string_pretty(&template)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&secret_path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}
