//! GeminiChatAgent - streamed chat gateway over the Gemini REST API.
//!
//! Each turn request carries the full prior history plus the session's
//! system framing, and is answered as a server-sent-event stream of text
//! chunks that concatenate to the final assistant turn.

use crate::wire::{
    BASE_URL, Content, GenerateContentRequest, GenerateContentResponse, Part, chunk_text,
    map_http_error, map_transport_error,
};
use futures::StreamExt;
use mindsketch_core::config::DEFAULT_CHAT_MODEL;
use mindsketch_core::conversation::{ChatTurn, TurnRole};
use mindsketch_core::error::{Result, SketchError};
use mindsketch_core::gateway::{ChatGateway, ChatStream};
use mindsketch_core::secret::SecretService;
use mindsketch_infrastructure::SecretServiceImpl;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Chat gateway implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiChatAgent {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiChatAgent {
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
    /// Model name defaults to `gemini-3-flash-preview`.
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

        Ok(Self::new(gemini_config.api_key, DEFAULT_CHAT_MODEL))
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

    fn build_contents(history: &[ChatTurn], message: &str) -> Vec<Content> {
        let mut contents: Vec<Content> = history.iter().map(turn_to_content).collect();
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part::Text {
                text: message.to_string(),
            }],
        });
        contents
    }
}

fn turn_to_content(turn: &ChatTurn) -> Content {
    let role = match turn.role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    };
    Content {
        role: role.to_string(),
        parts: vec![Part::Text {
            text: turn.text.clone(),
        }],
    }
}

/// Splits accumulated SSE bytes on line boundaries and decodes `data:`
/// events into text chunks. Lines without a complete terminator stay in the
/// buffer for the next network chunk.
fn drain_sse_events(buffer: &mut String) -> Vec<Result<String>> {
    let mut events = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            continue;
        }
        match serde_json::from_str::<GenerateContentResponse>(payload) {
            Ok(response) => {
                if let Some(text) = chunk_text(response) {
                    if !text.is_empty() {
                        events.push(Ok(text));
                    }
                }
            }
            Err(err) => {
                events.push(Err(SketchError::stream_interrupted(format!(
                    "malformed stream event: {err}"
                ))));
            }
        }
    }
    events
}

#[async_trait::async_trait]
impl ChatGateway for GeminiChatAgent {
    async fn stream_turn(
        &self,
        framing: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<ChatStream> {
        let request = GenerateContentRequest {
            contents: Self::build_contents(history, message),
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part::Text {
                    text: framing.to_string(),
                }],
            }),
            generation_config: None,
        };

        let url = format!(
            "{}/{model}:streamGenerateContent?alt=sse&key={api_key}",
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

        let chunks = response
            .bytes_stream()
            .scan(String::new(), |buffer, item| {
                let events = match item {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        drain_sse_events(buffer)
                    }
                    Err(err) => vec![Err(SketchError::stream_interrupted(format!(
                        "chat stream aborted: {err}"
                    )))],
                };
                futures::future::ready(Some(futures::stream::iter(events)))
            })
            .flatten();

        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_carry_history_then_message() {
        let history = vec![ChatTurn::model("안녕하세요"), ChatTurn::user("이전 질문")];
        let contents = GeminiChatAgent::build_contents(&history, "새 질문");

        let roles: Vec<&str> = contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["model", "user", "user"]);
        assert!(matches!(
            &contents.last().unwrap().parts[0],
            Part::Text { text } if text == "새 질문"
        ));
    }

    #[test]
    fn test_sse_events_decode_text_chunks() {
        let mut buffer = String::from(
            "data: {\"candidates\": [{\"content\": {\"parts\": [{\"text\": \"안\"}]}}]}\n\
             data: {\"candidates\": [{\"content\": {\"parts\": [{\"text\": \"녕\"}]}}]}\n",
        );
        let events = drain_sse_events(&mut buffer);
        let texts: Vec<String> = events.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(texts, vec!["안".to_string(), "녕".to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut buffer = String::from("data: {\"candidates\"");
        assert!(drain_sse_events(&mut buffer).is_empty());
        assert_eq!(buffer, "data: {\"candidates\"");

        buffer.push_str(": [{\"content\": {\"parts\": [{\"text\": \"끝\"}]}}]}\n");
        let events = drain_sse_events(&mut buffer);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), "끝");
    }

    #[test]
    fn test_housekeeping_chunks_and_blank_lines_skipped() {
        let mut buffer = String::from("\ndata: {\"candidates\": [{\"content\": {}}]}\n\n");
        assert!(drain_sse_events(&mut buffer).is_empty());
    }

    #[test]
    fn test_malformed_event_interrupts_stream() {
        let mut buffer = String::from("data: not-json\n");
        let events = drain_sse_events(&mut buffer);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].as_ref().unwrap_err(),
            SketchError::StreamInterrupted(_)
        ));
    }
}
