use querylab_core::traits::Scorer;
use querylab_core::types::{Document, HybridWeight, Scores};

/// Weighted sum of semantic and lexical scores, index by index.
pub fn blend(semantic: &Scores, lexical: &Scores, weight: HybridWeight) -> Scores {
    let values = semantic
        .values
        .iter()
        .zip(&lexical.values)
        .map(|(&s, &l)| weight.blend(s, l))
        .collect();
    Scores::new(values, hybrid_label(weight, &semantic.method, &lexical.method))
}

/// Names the weight and the exact sub-scorers (fallbacks included) that were blended.
pub fn hybrid_label(weight: HybridWeight, semantic: &str, lexical: &str) -> String {
    format!("Hybrid ({:.2}*{} + {:.2}*{})", weight.semantic(), semantic, weight.lexical(), lexical)
}

/// Runs both scorers over the same documents and blends the results.
pub struct HybridScorer<'a> {
    semantic: &'a dyn Scorer,
    lexical: &'a dyn Scorer,
}

impl<'a> HybridScorer<'a> {
    pub fn new(semantic: &'a dyn Scorer, lexical: &'a dyn Scorer) -> Self { Self { semantic, lexical } }

    pub fn score(&self, query: &str, docs: &[Document], weight: HybridWeight) -> Scores {
        blend(&self.semantic.score(query, docs), &self.lexical.score(query, docs), weight)
    }
}
