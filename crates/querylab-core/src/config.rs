//! Configuration loader and path helpers.
//!
//! Merges built-in defaults, `config.toml`, `config.<env>.toml`,
//! `secrets.toml`, `APP_*` env vars (`__` nests) and the well-known provider
//! key variables such as `OPENAI_API_KEY`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::Error;
use crate::types::HybridWeight;

/// Raw provider variables honoured without the `APP_` prefix.
const PROVIDER_KEY_VARS: [&str; 4] = ["OPENAI_API_KEY", "COHERE_API_KEY", "GROQ_API_KEY", "GEMINI_API_KEY"];

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Toml::file("secrets.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(
                Env::raw()
                    .only(&PROVIDER_KEY_VARS)
                    .map(|key| format!("secrets.{}", key.as_str().to_ascii_lowercase()).into()),
            );

        let config = Self { figment };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    /// Wrap an already-assembled figment (tests, embedding applications).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Extract and validate the typed settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(self.figment.clone())
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        match env {
            "prod" | "production" => {
                if settings.embedding.backend == EmbeddingBackend::Fake {
                    return Err(Error::InvalidConfig("the fake embedding backend is not allowed in production".into()).into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub secrets: Secrets,
}

impl Settings {
    pub fn hybrid_weight(&self) -> crate::error::Result<HybridWeight> {
        HybridWeight::new(self.search.hybrid_weight)
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.hybrid_weight()?;
        if self.search.top_k == 0 {
            return Err(Error::InvalidConfig("search.top_k must be at least 1".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::InvalidConfig("llm.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub hybrid_weight: f32,
    pub top_k: usize,
    /// Presentation threshold; the engine itself never filters.
    pub min_score: f32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { hybrid_weight: HybridWeight::DEFAULT, top_k: 5, min_score: 0.30 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Remote API when a key is configured, local model otherwise.
    Auto,
    Local,
    Remote,
    /// Deterministic hash embeddings, no model files needed.
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: Option<String>,
    pub model_id: String,
    pub max_len: usize,
    pub remote_model: String,
    pub remote_url: String,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Auto,
            model_dir: None,
            model_id: "all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            remote_model: "text-embedding-3-small".to_string(),
            remote_url: "https://api.openai.com/v1/embeddings".to_string(),
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub timeout_secs: u64,
    pub judge_max_tokens: u32,
    pub explain_max_tokens: u32,
    pub openai_model: String,
    pub cohere_model: String,
    pub groq_model: String,
    pub gemini_model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            judge_max_tokens: 10,
            explain_max_tokens: 200,
            openai_model: "gpt-4".to_string(),
            cohere_model: "command-r-plus".to_string(),
            groq_model: "llama3-70b-8192".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Provider credentials. Blank values count as absent.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Secrets {
    pub fn openai(&self) -> Option<&str> {
        non_blank(self.openai_api_key.as_deref())
    }

    pub fn cohere(&self) -> Option<&str> {
        non_blank(self.cohere_api_key.as_deref())
    }

    pub fn groq(&self) -> Option<&str> {
        non_blank(self.groq_api_key.as_deref())
    }

    pub fn gemini(&self) -> Option<&str> {
        non_blank(self.gemini_api_key.as_deref())
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |v: Option<&str>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("openai_api_key", &shown(self.openai()))
            .field("cohere_api_key", &shown(self.cohere()))
            .field("groq_api_key", &shown(self.groq()))
            .field("gemini_api_key", &shown(self.gemini()))
            .finish()
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
