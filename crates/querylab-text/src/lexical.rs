use tracing::{debug, warn};

use querylab_core::traits::Scorer;
use querylab_core::types::{Document, Scores};

use crate::index::TantivyScorer;
use crate::okapi::OkapiBm25;

pub const METHOD_TANTIVY: &str = "BM25 (Tantivy)";
pub const METHOD_OKAPI: &str = "BM25 (Okapi)";

/// Raw per-document scores from an inverted index.
pub type IndexScorer = Box<dyn Fn(&str, &[Document]) -> anyhow::Result<Vec<f32>> + Send + Sync>;

/// BM25 over document snippets, normalized to [0, 1] by the batch maximum.
pub struct LexicalScorer {
    index: Option<IndexScorer>,
    okapi: OkapiBm25,
}

impl LexicalScorer {
    /// Prefer the tantivy index, fall back to Okapi on any index error.
    pub fn new() -> Self { Self::with_index(Box::new(tantivy_scores)) }

    /// Use `index` as the primary path, Okapi as the fallback.
    pub fn with_index(index: IndexScorer) -> Self { Self { index: Some(index), okapi: OkapiBm25::default() } }

    /// Skip the index and always use the in-process Okapi scorer.
    pub fn okapi_only() -> Self { Self { index: None, okapi: OkapiBm25::default() } }
}

fn tantivy_scores(query: &str, docs: &[Document]) -> anyhow::Result<Vec<f32>> {
    TantivyScorer::build(docs)?.raw_scores(query)
}

impl Default for LexicalScorer {
    fn default() -> Self { Self::new() }
}

impl Scorer for LexicalScorer {
    fn score(&self, query: &str, docs: &[Document]) -> Scores {
        if docs.is_empty() {
            let method = if self.index.is_some() { METHOD_TANTIVY } else { METHOD_OKAPI };
            return Scores::new(Vec::new(), method);
        }
        if let Some(index) = &self.index {
            match index(query, docs) {
                Ok(raw) if raw.len() == docs.len() => {
                    debug!("Tantivy scored {} documents", raw.len());
                    return Scores::new(normalize_by_max(raw), METHOD_TANTIVY);
                }
                Ok(raw) => warn!("Index returned {} scores for {} documents, falling back to Okapi BM25", raw.len(), docs.len()),
                Err(e) => warn!("Tantivy scoring failed, falling back to Okapi BM25: {e:#}"),
            }
        }
        Scores::new(normalize_by_max(self.okapi.raw_scores(query, docs)), METHOD_OKAPI)
    }
}

/// Divide every score by the batch maximum. A non-positive maximum (empty
/// batch, no matches) is treated as 1.0 so nothing is divided by zero.
pub fn normalize_by_max(raw: Vec<f32>) -> Vec<f32> {
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let max = if max > 0.0 { max } else { 1.0 };
    raw.into_iter().map(|s| s / max).collect()
}
