use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

/// Failure of a single provider call.
///
/// All variants are absorbed by the judge and the explainer; they only reach
/// the user through log lines, health-check reports and explanation output.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} API key not configured")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::MalformedResponse(err.to_string())
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::MalformedResponse(err.to_string())
    }
}
