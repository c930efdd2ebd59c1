use crate::types::{Document, Scores};

/// Maps texts to fixed-length vectors.
pub trait Embedder: Send + Sync {
    /// Human-readable backend name, surfaced in result method labels.
    fn label(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Produces one score per document for a query.
///
/// Implementations absorb their own failures: a scorer that cannot run
/// returns zeros and says so in `Scores::method`.
pub trait Scorer: Send + Sync {
    fn score(&self, query: &str, docs: &[Document]) -> Scores;
}
