use anyhow::{Result, anyhow};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use querylab_core::config::{EmbeddingBackend, EmbeddingSettings};
use querylab_core::traits::Embedder;

use crate::fake::HashEmbedder;
use crate::local::{resolve_model_dir, LocalEmbedder};

pub type EmbedderFactory = Box<dyn Fn() -> Result<Arc<dyn Embedder>> + Send + Sync>;

/// Owns the process-wide local embedding model.
///
/// The model is built on the first `get_or_init` call and shared read-only
/// afterwards. A failed build is remembered too, so a missing model directory
/// is reported once instead of being retried on every request.
pub struct ResourceManager {
    factory: EmbedderFactory,
    embedder: OnceLock<std::result::Result<Arc<dyn Embedder>, String>>,
}

impl ResourceManager {
    pub fn new(settings: &EmbeddingSettings) -> Self {
        let settings = settings.clone();
        Self::with_factory(move || build_local(&settings))
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>> + Send + Sync + 'static,
    {
        Self { factory: Box::new(factory), embedder: OnceLock::new() }
    }

    /// Use an already-built embedder.
    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_factory(move || Ok(embedder.clone()))
    }

    pub fn get_or_init(&self) -> Result<Arc<dyn Embedder>> {
        let slot = self.embedder.get_or_init(|| match (self.factory)() {
            Ok(embedder) => {
                info!("Embedding model ready: {} (dim {})", embedder.label(), embedder.dim());
                Ok(embedder)
            }
            Err(e) => {
                warn!("Embedding model unavailable: {e:#}");
                Err(format!("{e:#}"))
            }
        });
        match slot {
            Ok(embedder) => Ok(embedder.clone()),
            Err(msg) => Err(anyhow!("embedding model unavailable: {msg}")),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.embedder.get().is_some()
    }
}

fn build_local(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if settings.backend == EmbeddingBackend::Fake {
        return Ok(Arc::new(HashEmbedder::new(settings.fake_dim)));
    }
    let dir = resolve_model_dir(settings.model_dir.as_deref(), &settings.model_id)?;
    Ok(Arc::new(LocalEmbedder::load(&dir, &settings.model_id, settings.max_len)?))
}
