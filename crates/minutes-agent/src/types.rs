use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Connection settings for the hosted LLM.
///
/// Secrets come from the environment rather than workspace files.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    /// Used for transcripts under the short-transcript threshold.
    pub small_model: String,
    /// Used for everything longer.
    pub large_model: String,
    pub max_tokens: u32,
}

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_SMALL_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_LARGE_MODEL: &str = "claude-sonnet-4-5";

impl LlmConfig {
    /// Read configuration from `SOP_LLM_*` environment variables.
    pub fn from_env() -> Result<Self, crate::MinutesError> {
        let api_key =
            std::env::var("SOP_LLM_API_KEY").map_err(|_| crate::MinutesError::MissingApiKey)?;
        Ok(Self {
            base_url: std::env::var("SOP_LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            small_model: std::env::var("SOP_LLM_SMALL_MODEL")
                .unwrap_or_else(|_| DEFAULT_SMALL_MODEL.to_string()),
            large_model: std::env::var("SOP_LLM_LARGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_LARGE_MODEL.to_string()),
            max_tokens: 2048,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types (messages API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// The first text block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.kind == "text")
            .map(|b| b.text.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Prompt register for minute generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutesMode {
    Concise,
    Detailed,
}

impl Default for MinutesMode {
    fn default() -> Self {
        MinutesMode::Concise
    }
}

/// Structured minutes as returned by the generation function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutesDraft {
    pub tldr: String,
    #[serde(default)]
    pub discussion_points: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub action_log: String,
    #[serde(default)]
    pub quote: String,
    /// Filled in by the client, not the model.
    #[serde(default)]
    pub model_used: String,
}

/// A polished email draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_picks_first_text_block() {
        let resp = MessagesResponse {
            model: "m".into(),
            content: vec![
                ContentBlock {
                    kind: "tool_use".into(),
                    text: String::new(),
                },
                ContentBlock {
                    kind: "text".into(),
                    text: "hello".into(),
                },
            ],
        };
        assert_eq!(resp.text(), Some("hello"));
    }

    #[test]
    fn response_text_none_when_empty() {
        let resp = MessagesResponse {
            model: "m".into(),
            content: vec![],
        };
        assert!(resp.text().is_none());
    }

    #[test]
    fn minutes_draft_tolerates_missing_fields() {
        let draft: MinutesDraft = serde_json::from_str(r#"{"tldr":"short"}"#).unwrap();
        assert_eq!(draft.tldr, "short");
        assert!(draft.discussion_points.is_empty());
        assert!(draft.quote.is_empty());
    }
}
