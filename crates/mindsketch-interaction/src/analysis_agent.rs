//! GeminiAnalysisAgent - analysis gateway over the Gemini REST API.
//!
//! Packages the three captured drawings into one `generateContent` call with
//! a response schema constraining the output to the analysis report shape.
//! Configuration is loaded from secret.json.

use crate::prompts::HTP_ANALYSIS_PROMPT;
use crate::wire::{
    BASE_URL, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineDataPayload, Part, extract_text, map_http_error, map_transport_error,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use mindsketch_core::analysis::{AnalysisReport, AnalysisResult};
use mindsketch_core::config::DEFAULT_ANALYSIS_MODEL;
use mindsketch_core::error::{Result, SketchError};
use mindsketch_core::flow::{DrawingSet, TestRun};
use mindsketch_core::gateway::AnalysisGateway;
use mindsketch_core::secret::SecretService;
use mindsketch_infrastructure::SecretServiceImpl;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Analysis gateway implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiAnalysisAgent {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiAnalysisAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads configuration from secret.json.
    ///
    /// Model name defaults to `gemini-3-pro-preview` if not specified.
    ///
    /// # Errors
    ///
    /// Returns `Credential` when the secret file or the Gemini key is
    /// missing or blank, so the caller can route into re-authorization.
    pub async fn try_from_env() -> Result<Self> {
        let service = SecretServiceImpl::default_location()
            .map_err(|e| SketchError::config(format!("Failed to initialize SecretService: {e}")))?;
        Self::try_from_secrets(&service).await
    }

    /// Loads configuration from an explicit secret service.
    pub async fn try_from_secrets(service: &dyn SecretService) -> Result<Self> {
        let secret_config = service
            .load_secrets()
            .await
            .map_err(SketchError::credential)?;

        let gemini_config = secret_config.gemini.ok_or_else(|| {
            SketchError::credential("Gemini configuration not found in secret.json")
        })?;

        if gemini_config.api_key.trim().is_empty() {
            return Err(SketchError::credential("Gemini API key is empty"));
        }

        let model = gemini_config
            .model_name
            .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string());

        Ok(Self::new(gemini_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the request timeout after construction.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_parts(&self, drawings: &DrawingSet<'_>) -> Vec<Part> {
        let mut parts = vec![Part::Text {
            text: HTP_ANALYSIS_PROMPT.to_string(),
        }];
        for (_key, image) in drawings.in_order() {
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: "image/png".to_string(),
                    data: BASE64_STANDARD.encode(image.png()),
                },
            });
        }
        parts
    }

    async fn request_report(&self, drawings: &DrawingSet<'_>) -> Result<AnalysisReport> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: self.build_parts(drawings),
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            }),
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| SketchError::upstream(None, format!("Failed to parse Gemini response: {err}")))?;

        let text = extract_text(parsed)?;
        parse_report(&text)
    }
}

#[async_trait::async_trait]
impl AnalysisGateway for GeminiAnalysisAgent {
    async fn analyze(&self, drawings: &TestRun) -> Result<AnalysisResult> {
        // Defensive check; the sequencer makes an incomplete run unreachable.
        let set = drawings.require_complete()?;
        let report = self.request_report(&set).await?;
        tracing::debug!(traits = report.personality_traits.len(), "analysis response accepted");
        Ok(AnalysisResult::assign(report))
    }
}

/// Parses and validates the schema-constrained report payload.
///
/// A payload missing any required field, carrying the wrong type, or scoring
/// outside the bounded range is rejected rather than surfaced as a
/// partially-populated result.
fn parse_report(text: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport = serde_json::from_str(text)
        .map_err(|err| SketchError::schema(format!("analysis payload rejected: {err}")))?;
    report.validate_scores()?;
    Ok(report)
}

/// The response schema sent with every analysis request; mirrors the
/// AnalysisReport shape with all five fields required.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "personalityTraits": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "trait": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "description": { "type": "STRING" },
                    },
                    "required": ["trait", "score", "description"],
                },
            },
            "emotionalState": { "type": "STRING" },
            "advice": { "type": "STRING" },
            "keyInsights": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
            },
        },
        "required": ["summary", "personalityTraits", "emotionalState", "advice", "keyInsights"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsketch_core::capture::{CapturedImage, Modality};
    use mindsketch_core::flow::DrawingStage;

    fn complete_run() -> TestRun {
        let mut run = TestRun::new();
        run.insert(
            DrawingStage::House,
            CapturedImage::new(vec![1, 2], Modality::Freehand, 4, 4),
        );
        run.insert(
            DrawingStage::Tree,
            CapturedImage::new(vec![3, 4], Modality::Imported, 4, 4),
        );
        run.insert(
            DrawingStage::Person,
            CapturedImage::new(vec![5, 6], Modality::Camera, 4, 4),
        );
        run
    }

    #[tokio::test]
    async fn test_analyze_rejects_incomplete_run_before_any_call() {
        let agent = GeminiAnalysisAgent::new("key", "model");
        let run = TestRun::new();
        assert!(matches!(
            agent.analyze(&run).await.unwrap_err(),
            SketchError::MissingInput(_)
        ));
    }

    #[test]
    fn test_request_carries_prompt_then_three_images() {
        let agent = GeminiAnalysisAgent::new("key", "model");
        let run = complete_run();
        let set = run.require_complete().unwrap();
        let parts = agent.build_parts(&set);
        assert_eq!(parts.len(), 4);
        assert!(matches!(&parts[0], Part::Text { text } if text == HTP_ANALYSIS_PROMPT));
        for part in &parts[1..] {
            assert!(matches!(part, Part::InlineData { .. }));
        }
    }

    #[test]
    fn test_response_schema_requires_all_five_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec!["summary", "personalityTraits", "emotionalState", "advice", "keyInsights"]
        );
    }

    #[test]
    fn test_parse_report_rejects_missing_key_insights() {
        let payload = r#"{
            "summary": "s",
            "personalityTraits": [{"trait": "t", "score": 10, "description": "d"}],
            "emotionalState": "e",
            "advice": "a"
        }"#;
        assert!(parse_report(payload).unwrap_err().is_schema());
    }

    #[test]
    fn test_parse_report_rejects_out_of_range_score() {
        let payload = r#"{
            "summary": "s",
            "personalityTraits": [{"trait": "t", "score": 180, "description": "d"}],
            "emotionalState": "e",
            "advice": "a",
            "keyInsights": []
        }"#;
        assert!(parse_report(payload).unwrap_err().is_schema());
    }

    #[test]
    fn test_parse_report_accepts_well_formed_payload() {
        let payload = r#"{
            "summary": "요약",
            "personalityTraits": [{"trait": "개방성", "score": 72, "description": "d"}],
            "emotionalState": "평온",
            "advice": "조언",
            "keyInsights": ["첫 번째"]
        }"#;
        let report = parse_report(payload).unwrap();
        assert_eq!(report.summary, "요약");
        assert_eq!(report.personality_traits[0].score, 72.0);
    }
}
