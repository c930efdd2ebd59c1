use anyhow::{Result, ensure};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use querylab_core::config::{EmbeddingBackend, EmbeddingSettings, Secrets};
use querylab_core::traits::Embedder;

use crate::remote::RemoteEmbedder;
use crate::resource::ResourceManager;

/// Vectors for a batch of texts plus the label of the backend that made them.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedded {
    pub vectors: Vec<Vec<f32>>,
    pub backend: String,
}

/// Embedding front door used by the semantic scorer.
///
/// Tries the remote backend first when one is configured, silently falling
/// back to the local model on any failure. Every batch is served by exactly
/// one backend. Vectors are cached per `(backend, text)` for the life of the
/// service, without eviction.
pub struct EmbeddingService {
    resources: Arc<ResourceManager>,
    remote: Option<Box<dyn Embedder>>,
    cache: Mutex<HashMap<(String, String), Vec<f32>>>,
}

impl EmbeddingService {
    pub fn new(resources: Arc<ResourceManager>) -> Self {
        Self { resources, remote: None, cache: Mutex::new(HashMap::new()) }
    }

    pub fn with_remote(mut self, remote: Box<dyn Embedder>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Wire the backends described by `settings`; remote only when a key exists.
    pub fn from_settings(settings: &EmbeddingSettings, secrets: &Secrets, timeout: Duration) -> Self {
        let service = Self::new(Arc::new(ResourceManager::new(settings)));
        let wants_remote = matches!(settings.backend, EmbeddingBackend::Auto | EmbeddingBackend::Remote);
        match (wants_remote, secrets.openai()) {
            (true, Some(key)) => match RemoteEmbedder::new(&settings.remote_url, &settings.remote_model, key, timeout) {
                Ok(remote) => service.with_remote(Box::new(remote)),
                Err(e) => {
                    warn!("Remote embeddings disabled: {e:#}");
                    service
                }
            },
            (true, None) if settings.backend == EmbeddingBackend::Remote => {
                warn!("embedding.backend = \"remote\" but no OpenAI key is configured; using the local model");
                service
            }
            _ => service,
        }
    }

    pub fn embed(&self, texts: &[String]) -> Result<Embedded> {
        if let Some(remote) = &self.remote {
            match self.embed_cached(remote.as_ref(), texts) {
                Ok(vectors) => return Ok(Embedded { vectors, backend: remote.label().to_string() }),
                Err(e) => warn!("Remote embedding failed, using local model: {e:#}"),
            }
        }
        let local = self.resources.get_or_init()?;
        let vectors = self.embed_cached(local.as_ref(), texts)?;
        Ok(Embedded { vectors, backend: local.label().to_string() })
    }

    fn embed_cached(&self, embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let backend = embedder.label().to_string();
        let mut out: Vec<Option<Vec<f32>>> = {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            texts.iter().map(|t| cache.get(&(backend.clone(), t.clone())).cloned()).collect()
        };
        let missing: Vec<usize> = out.iter().enumerate().filter(|(_, v)| v.is_none()).map(|(i, _)| i).collect();
        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = embedder.embed_batch(&batch)?;
            ensure!(fresh.len() == batch.len(), "{} returned {} vectors for {} texts", backend, fresh.len(), batch.len());
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            for (&i, vector) in missing.iter().zip(fresh) {
                cache.insert((backend.clone(), texts[i].clone()), vector.clone());
                out[i] = Some(vector);
            }
        }
        debug!("{}: {} cached, {} embedded", backend, texts.len() - missing.len(), missing.len());
        Ok(out.into_iter().flatten().collect())
    }
}
