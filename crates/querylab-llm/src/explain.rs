//! Narrated explanation of a retrieval strategy, delivered as a stream of
//! text fragments.

use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

use querylab_core::config::LlmSettings;
use querylab_core::types::SearchMode;

use crate::provider::{CompletionOptions, LlmProvider};

pub const LLM_UNAVAILABLE: &str = "[LLM unavailable: Could not explain retrieval strategy.\n\n\
Typical LLM usage: LLMs can be used to explain, summarize, or re-rank search results, \
provide natural language answers, or generate explanations for retrieval strategies. \
If you see this message, it means no LLM provider is available, misconfigured, or all failed.";

pub fn explain_prompt(mode: SearchMode) -> String {
    format!(
        "Explain in 3-5 sentences, for a developer audience, how a '{}' search mode works in a modern search system. \
Include the pros, cons, and typical use cases. Use clear, technical language.",
        mode
    )
}

#[derive(Clone)]
pub struct Explainer {
    providers: Vec<Arc<dyn LlmProvider>>,
    options: CompletionOptions,
}

impl Explainer {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers, options: CompletionOptions::new(200, 0.3) }
    }

    pub fn from_settings(providers: Vec<Arc<dyn LlmProvider>>, settings: &LlmSettings) -> Self {
        Self { providers, options: CompletionOptions::new(settings.explain_max_tokens, 0.3) }
    }

    /// Start a producer thread and hand back the receiving end.
    ///
    /// The channel has no buffer, so the producer runs at the consumer's
    /// pace; dropping the receiver ends it at the next fragment.
    pub fn explain(&self, mode: SearchMode) -> Receiver<String> {
        let (tx, rx) = sync_channel::<String>(0);
        let explainer = self.clone();
        thread::spawn(move || {
            explainer.explain_with(mode, &mut |fragment: String| tx.send(fragment).is_ok());
        });
        rx
    }

    /// Run the provider chain on the current thread, feeding `sink`.
    ///
    /// The first provider that delivers at least one fragment ends the chain.
    /// When none does, each provider error is emitted followed by
    /// [`LLM_UNAVAILABLE`].
    pub fn explain_with(&self, mode: SearchMode, sink: &mut dyn FnMut(String) -> bool) {
        let prompt = explain_prompt(mode);
        let mut errors = Vec::new();
        for provider in &self.providers {
            let mut open = true;
            let mut forward = |fragment: String| {
                open = sink(fragment);
                open
            };
            match provider.stream(&prompt, &self.options, &mut forward) {
                Ok(0) => debug!("{} returned an empty explanation", provider.name()),
                Ok(n) => {
                    debug!("{} streamed {} fragments", provider.name(), n);
                    return;
                }
                Err(e) => {
                    warn!("{} explanation failed: {}", provider.name(), e);
                    errors.push(format!("[{} error: {}]", provider.name(), e));
                }
            }
            if !open {
                return;
            }
        }
        for message in errors.into_iter().chain(std::iter::once(LLM_UNAVAILABLE.to_string())) {
            if !sink(message) {
                return;
            }
        }
    }
}
