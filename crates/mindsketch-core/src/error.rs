//! Error types for the MindSketch engine.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire MindSketch engine.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. The capture, analysis, and
/// conversation layers all report through this one taxonomy so that callers
/// can route recovery (re-authorization, back-off guidance, local retry)
/// without string matching.
#[derive(Error, Debug, Clone, Serialize)]
pub enum SketchError {
    /// Device access (camera) was denied by the platform or the user.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The canvas was never drawn to and no still was imported or captured.
    #[error("Nothing to commit: the canvas has no drawable content")]
    EmptyCanvas,

    /// Fewer than three drawings were supplied to the analysis gateway.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The reasoning service reported missing or invalid access credentials.
    #[error("Credential error: {0}")]
    Credential(String),

    /// The reasoning service reported a rate or usage limit.
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// Any other upstream failure (non-2xx status, transport error).
    #[error("Upstream error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// A response was received but does not parse into the expected shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A streamed chat turn was terminated mid-delivery.
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "PNG", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SketchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Permission error
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    /// Creates a MissingInput error
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    /// Creates a Credential error
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Creates a Quota error
    pub fn quota(message: impl Into<String>) -> Self {
        Self::Quota(message.into())
    }

    /// Creates an Upstream error with an optional HTTP status
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Creates a Schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Creates a StreamInterrupted error
    pub fn stream_interrupted(message: impl Into<String>) -> Self {
        Self::StreamInterrupted(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Credential error (triggers the re-authorization path)
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }

    /// Check if this is a Quota error
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }

    /// Check if this is a Schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the user-facing guidance message for this error class.
    ///
    /// Credential and quota failures carry guidance distinct from the generic
    /// message because the caller offers different recovery (re-registering a
    /// key vs. waiting) for each.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Permission(_) => "카메라 권한이 필요합니다.",
            Self::EmptyCanvas => "그림을 그리거나 사진을 불러온 뒤 완료해 주세요.",
            Self::MissingInput(_) => "모든 그림(집, 나무, 사람)을 그려주셔야 분석이 가능합니다.",
            Self::Credential(_) => "서버에 API 키가 설정되지 않았습니다. 키를 확인해 주세요.",
            Self::Quota(_) => "상담사가 현재 다른 내담자와 대화 중입니다. 잠시 후 다시 말을 걸어주세요.",
            _ => "심리 분석 엔진에 연결할 수 없습니다. 다시 시도해 주세요.",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SketchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SketchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SketchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SketchError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for SketchError {
    fn from(err: image::ImageError) -> Self {
        Self::Serialization {
            format: "image".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, used at infrastructure edges)
impl From<anyhow::Error> for SketchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SketchError>`.
pub type Result<T> = std::result::Result<T, SketchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_guidance_differs_from_generic() {
        let quota = SketchError::quota("429");
        let upstream = SketchError::upstream(Some(500), "boom");
        assert_ne!(quota.user_message(), upstream.user_message());
    }

    #[test]
    fn test_credential_guidance_differs_from_generic() {
        let credential = SketchError::credential("missing key");
        let upstream = SketchError::upstream(None, "boom");
        assert!(credential.is_credential());
        assert_ne!(credential.user_message(), upstream.user_message());
    }

    #[test]
    fn test_predicates() {
        assert!(SketchError::quota("q").is_quota());
        assert!(SketchError::schema("s").is_schema());
        assert!(SketchError::not_found("result", "123").is_not_found());
        assert!(!SketchError::upstream(Some(502), "x").is_quota());
    }
}
