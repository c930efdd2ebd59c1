use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use querylab_core::traits::Embedder;

/// Deterministic bag-of-words embeddings from hashed, lowercased tokens.
///
/// Needs no model files or network. Identical texts map to identical unit
/// vectors and texts sharing words have positive cosine similarity.
pub struct HashEmbedder {
    dim: usize,
    label: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1), label: format!("Hash embedding (d{})", dim.max(1)) }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += val;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashEmbedder {
    fn label(&self) -> &str { &self.label }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
