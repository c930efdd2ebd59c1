//! OpenAI-compatible `/chat/completions` client, also used for Groq.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::debug;

use super::http::{build_client, send, send_json, text_at};
use crate::error::{LlmError, Result};
use crate::provider::{emit_sentences, CompletionOptions, LlmProvider};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: Client,
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    token_streaming: bool,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Self::compatible("OpenAI", OPENAI_BASE_URL, api_key, model, timeout)
    }

    /// Any server speaking the OpenAI chat protocol under `base_url`.
    pub fn compatible(name: &str, base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            token_streaming: true,
        })
    }

    /// Disable SSE streaming; `stream` then emits whole sentences.
    pub fn without_token_streaming(mut self) -> Self {
        self.token_streaming = false;
        self
    }

    fn body(&self, prompt: &str, options: &CompletionOptions, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "stream": stream,
        })
    }

    fn request(&self, body: &Value) -> reqwest::blocking::RequestBuilder {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
    }
}

impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str { &self.name }
    fn model(&self) -> &str { &self.model }

    fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let response = send_json(self.request(&self.body(prompt, options, false)))?;
        text_at(&response, "/choices/0/message/content")
    }

    fn stream(&self, prompt: &str, options: &CompletionOptions, sink: &mut dyn FnMut(String) -> bool) -> Result<usize> {
        if !self.token_streaming {
            let text = self.complete(prompt, options)?;
            return Ok(emit_sentences(&text, sink));
        }
        let response = send(self.request(&self.body(prompt, options, true)))?;
        let mut sent = 0;
        for line in BufReader::new(response).lines() {
            let line = line.map_err(|e| LlmError::Http(e.to_string()))?;
            let Some(delta) = parse_sse_line(&line)? else { continue };
            match delta {
                SseEvent::Done => break,
                SseEvent::Delta(text) => {
                    if !sink(text) {
                        debug!("{}: consumer went away, stopping stream", self.name);
                        break;
                    }
                    sent += 1;
                }
            }
        }
        Ok(sent)
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    Delta(String),
    Done,
}

/// Decode one `data:` line of a chat-completions event stream.
///
/// Non-data lines and events without content yield `None`.
pub(crate) fn parse_sse_line(line: &str) -> Result<Option<SseEvent>> {
    let Some(payload) = line.strip_prefix("data:") else { return Ok(None) };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }
    let event: Value = serde_json::from_str(payload)?;
    Ok(event
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| SseEvent::Delta(s.to_string())))
}
