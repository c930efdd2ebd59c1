//! OpenAI-compatible `/v1/embeddings` backend over blocking HTTP.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;

use querylab_core::traits::Embedder;

pub struct RemoteEmbedder {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    dim: usize,
    label: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            dim: known_dim(model),
            label: format!("OpenAI {model}"),
        })
    }
}

/// Output width of the published OpenAI embedding models; 0 when unknown.
fn known_dim(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "text-embedding-3-small" | "text-embedding-ada-002" => 1536,
        _ => 0,
    }
}

impl Embedder for RemoteEmbedder {
    fn label(&self) -> &str { &self.label }
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::json!({ "model": self.model, "input": texts });
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("Embedding request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            bail!("Embedding API returned {}: {}", status, body);
        }
        let mut parsed: EmbeddingResponse = resp.json().context("Failed to parse embedding response")?;
        if parsed.data.len() != texts.len() {
            bail!("Embedding API returned {} vectors for {} inputs", parsed.data.len(), texts.len());
        }
        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}
