use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;

use super::http::{build_client, send_json, text_at};
use crate::error::Result;
use crate::provider::{CompletionOptions, LlmProvider};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { client: build_client(timeout)?, api_key: api_key.to_string(), model: model.to_string() })
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str { "Gemini" }
    fn model(&self) -> &str { &self.model }

    fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": options.max_tokens,
                "temperature": options.temperature,
            },
        });
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let request = self.client.post(url).header("x-goog-api-key", &self.api_key).json(&body);
        let response = send_json(request)?;
        Ok(text_at(&response, "/candidates/0/content/parts/0/text")?.trim().to_string())
    }
}
