use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use querylab_core::config::LlmSettings;
use querylab_core::traits::Scorer;
use querylab_core::types::{Document, Scores};

use crate::provider::{CompletionOptions, LlmProvider};

pub const METHOD_NO_PROVIDER: &str = "LLM (unavailable: no provider configured)";
pub const METHOD_ALL_FAILED: &str = "LLM (unavailable: all providers failed)";

/// Rates each document 0-1 with one completion call per document.
///
/// Providers are tried in order until one answers; that provider then scores
/// the rest of the batch. A provider that fails before the commit is not
/// asked again within the batch. Failed calls and unparsable answers score
/// 0.0. Ratings outside [0, 1] are kept as returned.
pub struct LlmJudge {
    providers: Vec<Arc<dyn LlmProvider>>,
    options: CompletionOptions,
}

impl LlmJudge {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers, options: CompletionOptions::new(10, 0.0) }
    }

    pub fn from_settings(providers: Vec<Arc<dyn LlmProvider>>, settings: &LlmSettings) -> Self {
        Self::new(providers).with_options(CompletionOptions::new(settings.judge_max_tokens, 0.0))
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

impl Scorer for LlmJudge {
    fn score(&self, query: &str, docs: &[Document]) -> Scores {
        if self.providers.is_empty() {
            return Scores::zeros(docs.len(), METHOD_NO_PROVIDER);
        }
        let mut values = vec![0.0f32; docs.len()];
        let mut pending: VecDeque<&Arc<dyn LlmProvider>> = self.providers.iter().collect();
        let mut committed: Option<&Arc<dyn LlmProvider>> = None;

        for (i, doc) in docs.iter().enumerate() {
            let prompt = judge_prompt(query, doc);
            if let Some(provider) = committed {
                match provider.complete(&prompt, &self.options) {
                    Ok(reply) => values[i] = parse_score(&reply),
                    Err(e) => warn!("{} failed on document {}: {}", provider.name(), i, e),
                }
                continue;
            }
            while let Some(provider) = pending.pop_front() {
                match provider.complete(&prompt, &self.options) {
                    Ok(reply) => {
                        debug!("LLM judge using {} {}", provider.name(), provider.model());
                        values[i] = parse_score(&reply);
                        committed = Some(provider);
                        break;
                    }
                    Err(e) => warn!("{} unavailable, trying next provider: {}", provider.name(), e),
                }
            }
        }

        let method = match committed {
            Some(p) => format!("LLM ({} {})", p.name(), p.model()),
            None if docs.is_empty() => "LLM".to_string(),
            None => METHOD_ALL_FAILED.to_string(),
        };
        Scores::new(values, method)
    }
}

pub fn judge_prompt(query: &str, doc: &Document) -> String {
    format!(
        "Given the query: '{}', rate the relevance of the following document (0-1):\nTitle: {}\nSnippet: {}",
        query, doc.title, doc.snippet
    )
}

/// First whitespace-delimited token as a float; anything else is 0.0.
pub fn parse_score(reply: &str) -> f32 {
    reply
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<f32>().ok())
        .filter(|score| score.is_finite())
        .unwrap_or(0.0)
}
