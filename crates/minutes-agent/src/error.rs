use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinutesError {
    #[error("LLM API key not configured: set SOP_LLM_API_KEY")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response had no text content")]
    EmptyResponse,

    #[error("failed to parse LLM output as minutes: {source}\n  payload: {payload}")]
    Parse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}
