use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;

use super::http::{build_client, send_json, text_at};
use crate::error::Result;
use crate::provider::{CompletionOptions, LlmProvider};

pub const COHERE_CHAT_URL: &str = "https://api.cohere.com/v2/chat";

/// Cohere v2 chat endpoint.
pub struct CohereProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl CohereProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { client: build_client(timeout)?, api_key: api_key.to_string(), model: model.to_string() })
    }
}

impl LlmProvider for CohereProvider {
    fn name(&self) -> &str { "Cohere" }
    fn model(&self) -> &str { &self.model }

    fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        });
        let response = send_json(self.client.post(COHERE_CHAT_URL).bearer_auth(&self.api_key).json(&body))?;
        Ok(text_at(&response, "/message/content/0/text")?.trim().to_string())
    }
}
