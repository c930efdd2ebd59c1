//! querylab-embed
//!
//! Embedding backends behind `querylab_core::traits::Embedder`: a local
//! BERT sentence encoder (candle), a deterministic hash embedder and a remote
//! OpenAI-compatible API, plus the `ResourceManager` that owns the local model
//! and the caching `EmbeddingService` that picks a backend per batch.

pub mod device;
pub mod fake;
pub mod local;
pub mod pool;
pub mod remote;
pub mod resource;
pub mod service;
pub mod tokenize;

pub use fake::HashEmbedder;
pub use local::LocalEmbedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;
pub use resource::ResourceManager;
pub use service::{Embedded, EmbeddingService};
