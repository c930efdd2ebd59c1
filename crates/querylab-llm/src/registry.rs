use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use querylab_core::config::{LlmSettings, Secrets};

use crate::error::{LlmError, Result};
use crate::provider::{CompletionOptions, LlmProvider};
use crate::providers::{groq, CohereProvider, GeminiProvider, OpenAiProvider};

const HEALTH_PROMPT: &str = "Say 'Hello World'";

/// One slot of the fallback chain: a provider, or the reason it is absent.
pub struct RegistryEntry {
    pub name: &'static str,
    pub model: String,
    pub provider: Result<Arc<dyn LlmProvider>>,
}

/// The fixed-priority provider chain: OpenAI, Cohere, Groq, Gemini.
///
/// Providers whose key is missing stay in the registry as `NotConfigured`
/// entries so the health check can report them.
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    pub fn from_settings(settings: &LlmSettings, secrets: &Secrets) -> Self {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let entries = vec![
            entry("OpenAI", &settings.openai_model, secrets.openai(), |key, model| {
                Ok(Arc::new(OpenAiProvider::new(key, model, timeout)?))
            }),
            entry("Cohere", &settings.cohere_model, secrets.cohere(), |key, model| {
                Ok(Arc::new(CohereProvider::new(key, model, timeout)?))
            }),
            entry("Groq", &settings.groq_model, secrets.groq(), |key, model| {
                Ok(Arc::new(groq(key, model, timeout)?))
            }),
            entry("Gemini", &settings.gemini_model, secrets.gemini(), |key, model| {
                Ok(Arc::new(GeminiProvider::new(key, model, timeout)?))
            }),
        ];
        let registry = Self { entries };
        info!("LLM providers available: {}", registry.available().len());
        registry
    }

    /// Registry over ready-made providers, in the given priority order.
    pub fn from_providers(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        let entries = providers
            .into_iter()
            .map(|p| RegistryEntry { name: "custom", model: p.model().to_string(), provider: Ok(p) })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Configured providers in priority order.
    pub fn available(&self) -> Vec<Arc<dyn LlmProvider>> {
        self.entries.iter().filter_map(|e| e.provider.as_ref().ok().cloned()).collect()
    }

    /// Ping every provider with a trivial prompt.
    pub fn health_check(&self) -> Vec<HealthReport> {
        let options = CompletionOptions::new(10, 0.0);
        self.entries
            .iter()
            .map(|entry| {
                let status = match &entry.provider {
                    Err(LlmError::NotConfigured(_)) => HealthStatus::MissingKey,
                    Err(e) => HealthStatus::Failed(e.to_string()),
                    Ok(provider) => match provider.complete(HEALTH_PROMPT, &options) {
                        Ok(reply) => HealthStatus::Ok(reply.trim().to_string()),
                        Err(e) => HealthStatus::Failed(e.to_string()),
                    },
                };
                let name = match &entry.provider {
                    Ok(provider) => provider.name().to_string(),
                    Err(_) => entry.name.to_string(),
                };
                debug!("health {}: {:?}", name, status);
                HealthReport { name, model: entry.model.clone(), status }
            })
            .collect()
    }
}

fn entry<F>(name: &'static str, model: &str, key: Option<&str>, build: F) -> RegistryEntry
where
    F: FnOnce(&str, &str) -> Result<Arc<dyn LlmProvider>>,
{
    let provider = match key {
        Some(key) => build(key, model),
        None => Err(LlmError::NotConfigured(name.to_string())),
    };
    RegistryEntry { name, model: model.to_string(), provider }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Ok(String),
    MissingKey,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub name: String,
    pub model: String,
    pub status: HealthStatus,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, HealthStatus::Ok(_))
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            HealthStatus::Ok(reply) => write!(f, "OK      {} ({}): {}", self.name, self.model, reply),
            HealthStatus::MissingKey => write!(f, "MISSING {}: API key not found", self.name),
            HealthStatus::Failed(e) => write!(f, "FAILED  {} ({}): {}", self.name, self.model, e),
        }
    }
}
