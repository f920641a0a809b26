//! Gemini REST wire types and error classification.
//!
//! Shared by the analysis and chat agents. The error mapping is what keeps
//! credential and quota failures distinguishable from generic upstream
//! failures all the way up to the user guidance layer.

use mindsketch_core::error::SketchError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Gemini generateContent endpoint root.
pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: serde_json::Value,
}

#[derive(Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

#[derive(Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
pub struct Candidate {
    pub content: Option<ContentResponse>,
}

#[derive(Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
pub struct PartResponse {
    pub text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Pulls the first candidate text out of a non-streamed response.
pub fn extract_text(response: GenerateContentResponse) -> Result<String, SketchError> {
    chunk_text(response).ok_or_else(|| {
        SketchError::upstream(None, "Gemini API returned no text in the response candidates")
    })
}

/// Pulls the candidate text out of one streamed chunk, if the chunk carries
/// any (housekeeping chunks legitimately don't).
pub fn chunk_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
}

/// Classifies a non-2xx response into the domain taxonomy.
///
/// 401/403 report invalid or missing credentials; 429 (or a body marked
/// RESOURCE_EXHAUSTED) reports quota exhaustion; everything else is a
/// generic upstream failure carrying the status.
pub fn map_http_error(status: StatusCode, body: String) -> SketchError {
    let (status_text, message) = match serde_json::from_str::<ErrorWrapper>(&body) {
        Ok(wrapper) => {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            let message = if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            };
            (status_text, message)
        }
        Err(_) => (String::new(), body),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SketchError::credential(message),
        StatusCode::TOO_MANY_REQUESTS => SketchError::quota(message),
        _ if status_text == "RESOURCE_EXHAUSTED" => SketchError::quota(message),
        _ => SketchError::upstream(Some(status.as_u16()), message),
    }
}

/// Classifies a transport-level failure (connect, timeout, body read).
pub fn map_transport_error(err: reqwest::Error) -> SketchError {
    SketchError::upstream(None, format!("Gemini API request failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: &str) -> GenerateContentResponse {
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn test_extract_text_from_candidates() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "분석 결과"}]}}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "분석 결과");
    }

    #[test]
    fn test_extract_text_without_candidates_is_upstream() {
        let response = parse(r#"{"candidates": []}"#);
        assert!(matches!(
            extract_text(response).unwrap_err(),
            SketchError::Upstream { .. }
        ));
    }

    #[test]
    fn test_chunk_without_parts_yields_none() {
        let response = parse(r#"{"candidates": [{"content": {}}]}"#);
        assert!(chunk_text(response).is_none());
    }

    #[test]
    fn test_quota_status_maps_to_quota() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        assert!(err.is_quota());
    }

    #[test]
    fn test_resource_exhausted_body_maps_to_quota_regardless_of_status() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "limit", "status": "RESOURCE_EXHAUSTED"}}"#.to_string(),
        );
        assert!(err.is_quota());
    }

    #[test]
    fn test_credential_statuses_map_to_credential() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = map_http_error(
                status,
                r#"{"error": {"message": "API key not valid"}}"#.to_string(),
            );
            assert!(err.is_credential(), "{status} should be a credential error");
        }
    }

    #[test]
    fn test_other_statuses_map_to_upstream_with_status() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "oops".to_string());
        match err {
            SketchError::Upstream { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_data_serializes_camel_case() {
        let part = Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: "image/png".to_string(),
                data: "QUJD".to_string(),
            },
        };
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["inlineData"]["mimeType"], "image/png");
    }
}
