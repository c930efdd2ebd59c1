use std::sync::Arc;
use tracing::{debug, warn};

use querylab_core::traits::Scorer;
use querylab_core::types::{Document, Scores};
use querylab_embed::EmbeddingService;

const COSINE_EPS: f32 = 1e-8;

/// Cosine similarity between the query and each document title.
pub struct SemanticScorer {
    service: Arc<EmbeddingService>,
}

impl SemanticScorer {
    pub fn new(service: Arc<EmbeddingService>) -> Self { Self { service } }
}

impl Scorer for SemanticScorer {
    fn score(&self, query: &str, docs: &[Document]) -> Scores {
        if docs.is_empty() {
            return Scores::new(Vec::new(), "Semantic");
        }
        // Query and titles go in one batch so both come from the same backend.
        let texts: Vec<String> = std::iter::once(query.to_string()).chain(docs.iter().map(|d| d.title.clone())).collect();
        match self.service.embed(&texts) {
            Ok(embedded) => {
                let (q, titles) = embedded.vectors.split_at(1);
                let values: Vec<f32> = titles.iter().map(|d| cosine(d, &q[0])).collect();
                debug!("Semantic scored {} titles with {}", values.len(), embedded.backend);
                Scores::new(values, format!("Semantic ({})", embedded.backend))
            }
            Err(e) => {
                warn!("Semantic scoring unavailable: {e:#}");
                Scores::zeros(docs.len(), format!("Semantic (unavailable: {e})"))
            }
        }
    }
}

/// `dot(a, b) / (|a| * |b| + 1e-8)`; 0.0 for zero vectors or mismatched lengths.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b + COSINE_EPS)
}
