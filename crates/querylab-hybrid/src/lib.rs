//! querylab-hybrid
//!
//! Semantic scoring, hybrid blending and the ranker that puts the four
//! retrieval strategies side by side.

pub mod blend;
pub mod chunks;
pub mod ranker;
pub mod semantic;

pub use blend::{blend, HybridScorer};
pub use chunks::{top_chunks, ChunkMatch};
pub use ranker::{top_k, Column, Comparison, Ranker, DEFAULT_TOP_K};
pub use semantic::{cosine, SemanticScorer};
