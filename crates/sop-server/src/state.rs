use minutes_agent::{LlmConfig, MinutesClient, MinutesError};
use std::path::PathBuf;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    /// Explicit LLM config (tests point this at a mock server). When `None`,
    /// the client is built from the environment per request.
    pub llm: Option<LlmConfig>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self { root, llm: None }
    }

    pub fn with_llm(root: PathBuf, llm: LlmConfig) -> Self {
        Self {
            root,
            llm: Some(llm),
        }
    }

    pub fn minutes_client(&self) -> Result<MinutesClient, MinutesError> {
        match &self.llm {
            Some(config) => Ok(MinutesClient::new(config.clone())),
            None => MinutesClient::from_env(),
        }
    }
}
