use tracing::{debug, warn};

use crate::error::MinutesError;
use crate::prompt::{email_prompt, extract_json, minutes_prompt, SHORT_TRANSCRIPT_CHARS};
use crate::types::{
    ChatMessage, EmailDraft, LlmConfig, MessagesRequest, MessagesResponse, MinutesDraft,
    MinutesMode,
};

/// HTTP client for the hosted messages API.
///
/// Holds a reusable [`reqwest::Client`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct MinutesClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl MinutesClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from `SOP_LLM_*` environment variables.
    pub fn from_env() -> Result<Self, MinutesError> {
        Ok(Self::new(LlmConfig::from_env()?))
    }

    /// Pick a model by transcript length.
    fn model_for(&self, transcript: &str) -> &str {
        if transcript.chars().count() <= SHORT_TRANSCRIPT_CHARS {
            &self.config.small_model
        } else {
            &self.config.large_model
        }
    }

    /// Generate structured minutes from a raw transcript.
    ///
    /// Short transcripts go to the small model, long ones to the large model.
    /// The `model_used` field of the returned draft records which one answered.
    pub async fn generate_minutes(
        &self,
        title: &str,
        transcript: &str,
        mode: MinutesMode,
    ) -> Result<MinutesDraft, MinutesError> {
        let model = self.model_for(transcript).to_string();
        debug!(%model, chars = transcript.chars().count(), "generating minutes");

        let text = self
            .complete(&model, minutes_prompt(title, transcript, mode))
            .await?;
        let payload = extract_json(&text);
        let mut draft: MinutesDraft =
            serde_json::from_str(payload).map_err(|source| MinutesError::Parse {
                payload: payload.to_string(),
                source,
            })?;
        draft.model_used = model;
        Ok(draft)
    }

    /// Polish a rough email draft.
    ///
    /// Falls back to a locally templated draft on any transport, status, or
    /// parse failure, so callers always get something sendable.
    pub async fn polish_email(&self, subject: &str, draft: &str) -> EmailDraft {
        match self.polish_email_remote(subject, draft).await {
            Ok(polished) => polished,
            Err(err) => {
                warn!(error = %err, "email polish failed, using local template");
                local_email_fallback(subject, draft)
            }
        }
    }

    async fn polish_email_remote(
        &self,
        subject: &str,
        draft: &str,
    ) -> Result<EmailDraft, MinutesError> {
        let model = self.config.small_model.clone();
        let text = self.complete(&model, email_prompt(subject, draft)).await?;
        let payload = extract_json(&text);
        serde_json::from_str(payload).map_err(|source| MinutesError::Parse {
            payload: payload.to_string(),
            source,
        })
    }

    /// One round trip to `/v1/messages`, returning the text content.
    async fn complete(&self, model: &str, prompt: String) -> Result<String, MinutesError> {
        let request = MessagesRequest {
            model: model.to_string(),
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MinutesError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .text()
            .map(str::to_string)
            .ok_or(MinutesError::EmptyResponse)
    }
}

/// Deterministic email draft used when the LLM is unreachable.
fn local_email_fallback(subject: &str, draft: &str) -> EmailDraft {
    EmailDraft {
        subject: subject.to_string(),
        body: format!("Hi all,\n\n{}\n\nBest regards", draft.trim()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: "test-key".into(),
            small_model: "small-model".into(),
            large_model: "large-model".into(),
            max_tokens: 2048,
        }
    }

    fn minutes_body(model: &str) -> String {
        serde_json::json!({
            "model": model,
            "content": [{
                "type": "text",
                "text": r#"{"tldr":"We slipped a week.","discussion_points":["load delayed"],"next_steps":["replan cutover"],"action_log":"| replan | alice | friday |","quote":"we slipped"}"#
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn short_transcript_uses_small_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"model": "small-model"}),
            ))
            .with_status(200)
            .with_body(minutes_body("small-model"))
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let draft = client
            .generate_minutes("Weekly", "short transcript", MinutesMode::Concise)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(draft.model_used, "small-model");
        assert_eq!(draft.tldr, "We slipped a week.");
        assert_eq!(draft.discussion_points, vec!["load delayed"]);
    }

    #[tokio::test]
    async fn long_transcript_uses_large_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"model": "large-model"}),
            ))
            .with_status(200)
            .with_body(minutes_body("large-model"))
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let transcript = "x".repeat(SHORT_TRANSCRIPT_CHARS + 1);
        let draft = client
            .generate_minutes("Weekly", &transcript, MinutesMode::Detailed)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(draft.model_used, "large-model");
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "model": "small-model",
                    "content": [{
                        "type": "text",
                        "text": "```json\n{\"tldr\":\"ok\"}\n```"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let draft = client
            .generate_minutes("m", "t", MinutesMode::Concise)
            .await
            .unwrap();
        assert_eq!(draft.tldr, "ok");
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let err = client
            .generate_minutes("m", "t", MinutesMode::Concise)
            .await
            .unwrap_err();
        match err {
            MinutesError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_minutes_payload_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "model": "small-model",
                    "content": [{"type": "text", "text": "not json at all"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let err = client
            .generate_minutes("m", "t", MinutesMode::Concise)
            .await
            .unwrap_err();
        assert!(matches!(err, MinutesError::Parse { .. }));
    }

    #[tokio::test]
    async fn polish_email_returns_remote_draft() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "model": "small-model",
                    "content": [{
                        "type": "text",
                        "text": r#"{"subject":"Cutover update","body":"Polished body."}"#
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let email = client.polish_email("cutover", "we r late").await;
        assert_eq!(email.subject, "Cutover update");
        assert_eq!(email.body, "Polished body.");
    }

    #[tokio::test]
    async fn polish_email_falls_back_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(503)
            .create_async()
            .await;

        let client = MinutesClient::new(test_config(server.url()));
        let email = client.polish_email("Cutover", "we are late").await;
        assert_eq!(email.subject, "Cutover");
        assert!(email.body.contains("we are late"));
        assert!(email.body.starts_with("Hi all,"));
    }

    #[tokio::test]
    async fn polish_email_falls_back_on_unreachable_host() {
        // Port 1 refuses connections.
        let client = MinutesClient::new(test_config("http://127.0.0.1:1".into()));
        let email = client.polish_email("Subject", "body text").await;
        assert_eq!(email.subject, "Subject");
        assert!(email.body.contains("body text"));
    }
}
