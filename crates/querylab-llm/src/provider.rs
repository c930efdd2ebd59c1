use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};

/// Generation knobs shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self { max_tokens, temperature }
    }
}

/// A text-completion backend reachable with a single blocking call.
pub trait LlmProvider: Send + Sync {
    /// Provider name as shown in labels and reports ("OpenAI", "Cohere", ...).
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Deliver the answer as a sequence of fragments.
    ///
    /// `sink` returns `false` when the consumer is gone; the provider stops
    /// producing at that point. Returns how many fragments were delivered.
    /// The default completes in one call and emits the text sentence by
    /// sentence.
    fn stream(
        &self,
        prompt: &str,
        options: &CompletionOptions,
        sink: &mut dyn FnMut(String) -> bool,
    ) -> Result<usize> {
        let text = self.complete(prompt, options)?;
        Ok(emit_sentences(&text, sink))
    }
}

/// Feed `text` to `sink` one sentence at a time until it refuses more.
pub fn emit_sentences(text: &str, sink: &mut dyn FnMut(String) -> bool) -> usize {
    let mut sent = 0;
    for sentence in split_sentences(text) {
        if !sink(sentence) {
            break;
        }
        sent += 1;
    }
    sent
}

/// A completion together with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub provider: String,
}

/// Ask each provider in turn and return the first answer.
///
/// With no providers this is `NotConfigured`; when all fail, the last error.
pub fn complete_first(providers: &[Arc<dyn LlmProvider>], prompt: &str, options: &CompletionOptions) -> Result<Completion> {
    let mut last = LlmError::NotConfigured("LLM".to_string());
    for provider in providers {
        match provider.complete(prompt, options) {
            Ok(text) => {
                debug!("{} answered", provider.name());
                return Ok(Completion { text, provider: format!("{} {}", provider.name(), provider.model()) });
            }
            Err(e) => {
                warn!("{} failed, trying next provider: {}", provider.name(), e);
                last = e;
            }
        }
    }
    Err(last)
}

/// Split on '.', trim, drop empty pieces and re-append the period.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.trim()
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}."))
        .collect()
}
