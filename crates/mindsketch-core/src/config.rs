//! Configuration types for the MindSketch engine.
//!
//! Secrets (API keys) and application settings are kept in separate files so
//! that config.toml can be shared or checked in while secret.json stays
//! private.

use serde::{Deserialize, Serialize};

/// Default model for the drawing analysis call.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
/// Default model for counselor chat turns.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Application settings loaded from config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model used for the HTP analysis request.
    pub analysis_model: String,
    /// Model used for counselor chat turns.
    pub chat_model: String,
    /// Timeout applied to outbound analysis/chat requests.
    pub request_timeout_secs: u64,
    /// Capture canvas width in pixels.
    pub canvas_width: u32,
    /// Capture canvas height in pixels.
    pub canvas_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            request_timeout_secs: 60,
            canvas_width: 800,
            canvas_height: 600,
        }
    }
}
