use std::time::Duration;

use super::openai::OpenAiProvider;
use crate::error::Result;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq serves the OpenAI chat protocol; answers are emitted per sentence.
pub fn groq(api_key: &str, model: &str, timeout: Duration) -> Result<OpenAiProvider> {
    Ok(OpenAiProvider::compatible("Groq", GROQ_BASE_URL, api_key, model, timeout)?.without_token_streaming())
}
