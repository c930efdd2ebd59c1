use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use querylab_core::config::{EmbeddingBackend, EmbeddingSettings, Secrets};
use querylab_core::traits::Embedder;
use querylab_embed::{EmbeddingService, HashEmbedder, ResourceManager};

/// Hash embedder that records how many texts it was asked to embed.
struct CountingEmbedder {
    inner: HashEmbedder,
    texts_seen: Arc<AtomicUsize>,
}

impl Embedder for CountingEmbedder {
    fn label(&self) -> &str { "counting" }
    fn dim(&self) -> usize { self.inner.dim() }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

struct FailingEmbedder {
    calls: Arc<Mutex<usize>>,
}

impl Embedder for FailingEmbedder {
    fn label(&self) -> &str { "OpenAI broken" }
    fn dim(&self) -> usize { 8 }
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.calls.lock().unwrap() += 1;
        Err(anyhow!("401 unauthorized"))
    }
}

fn texts(items: &[&str]) -> Vec<String> { items.iter().map(|s| s.to_string()).collect() }

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(384);
    let embs = embedder.embed_batch(&texts(&["hello world", "Hello  World"])).expect("embed_batch");
    let (v1, v2) = (&embs[0], &embs[1]);
    assert_eq!(v1.len(), 384, "embedding dim is 384");
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn hash_embedder_empty_text_is_zero_vector() {
    let v = HashEmbedder::new(16).embed_text("   ");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn resource_manager_builds_model_once() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let manager = ResourceManager::with_factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(HashEmbedder::new(8)) as Arc<dyn Embedder>)
    });
    assert!(!manager.is_initialized(), "construction is lazy");
    let a = manager.get_or_init().unwrap();
    let b = manager.get_or_init().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn resource_manager_remembers_failures() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let manager = ResourceManager::with_factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("no model files"))
    });
    assert!(manager.get_or_init().is_err());
    assert!(manager.get_or_init().is_err());
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn fake_backend_from_settings_needs_no_model_files() {
    let settings = EmbeddingSettings { backend: EmbeddingBackend::Fake, fake_dim: 32, ..EmbeddingSettings::default() };
    let manager = ResourceManager::new(&settings);
    let embedder = manager.get_or_init().expect("fake backend");
    assert_eq!(embedder.dim(), 32);
}

#[test]
fn missing_model_dir_is_an_error_not_a_panic() {
    let settings = EmbeddingSettings {
        backend: EmbeddingBackend::Local,
        model_dir: Some("/definitely/not/here".into()),
        ..EmbeddingSettings::default()
    };
    assert!(ResourceManager::new(&settings).get_or_init().is_err());
}

#[test]
fn service_caches_per_text() {
    let seen = Arc::new(AtomicUsize::new(0));
    let embedder = CountingEmbedder { inner: HashEmbedder::new(16), texts_seen: seen.clone() };
    let service = EmbeddingService::new(Arc::new(ResourceManager::with_embedder(Arc::new(embedder))));

    let first = service.embed(&texts(&["alpha", "beta"])).unwrap();
    let second = service.embed(&texts(&["beta", "gamma", "alpha"])).unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 3, "only 'gamma' is new on the second call");
    assert_eq!(first.vectors[0], second.vectors[2]);
    assert_eq!(first.vectors[1], second.vectors[0]);
    assert_eq!(second.backend, "counting");
}

#[test]
fn service_falls_back_to_local_when_remote_fails() {
    let calls = Arc::new(Mutex::new(0));
    let service = EmbeddingService::new(Arc::new(ResourceManager::with_embedder(Arc::new(HashEmbedder::new(16)))))
        .with_remote(Box::new(FailingEmbedder { calls: calls.clone() }));
    let out = service.embed(&texts(&["query", "title"])).expect("fallback succeeds");
    assert_eq!(out.vectors.len(), 2);
    assert_eq!(out.backend, "Hash embedding (d16)");
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn service_without_openai_key_stays_local() {
    let settings = EmbeddingSettings { backend: EmbeddingBackend::Fake, fake_dim: 8, ..EmbeddingSettings::default() };
    let service = EmbeddingService::from_settings(&settings, &Secrets::default(), std::time::Duration::from_secs(1));
    let out = service.embed(&texts(&["x"])).unwrap();
    assert_eq!(out.backend, "Hash embedding (d8)");
}
