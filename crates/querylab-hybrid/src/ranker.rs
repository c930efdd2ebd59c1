use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use querylab_core::config::Settings;
use querylab_core::traits::Scorer;
use querylab_core::types::{Document, HybridWeight, ScoredResult, Scores, SearchMode};
use querylab_embed::EmbeddingService;
use querylab_llm::{LlmJudge, LlmProvider};
use querylab_text::LexicalScorer;

use crate::blend::{blend, HybridScorer};
use crate::semantic::SemanticScorer;

pub const DEFAULT_TOP_K: usize = 5;

/// Dispatches a query to one of the four strategies and keeps the best hits.
pub struct Ranker {
    lexical: Box<dyn Scorer>,
    semantic: Box<dyn Scorer>,
    judge: Box<dyn Scorer>,
    top_k: usize,
}

impl Ranker {
    pub fn new(lexical: Box<dyn Scorer>, semantic: Box<dyn Scorer>, judge: Box<dyn Scorer>) -> Self {
        Self { lexical, semantic, judge, top_k: DEFAULT_TOP_K }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Standard wiring: tantivy/Okapi lexical, embedding-backed semantic, LLM judge.
    pub fn from_parts(service: Arc<EmbeddingService>, providers: Vec<Arc<dyn LlmProvider>>, settings: &Settings) -> Self {
        Self::new(
            Box::new(LexicalScorer::new()),
            Box::new(SemanticScorer::new(service)),
            Box::new(LlmJudge::from_settings(providers, &settings.llm)),
        )
        .with_top_k(settings.search.top_k)
    }

    /// Build every backend from settings alone.
    pub fn from_settings(settings: &Settings) -> Self {
        let timeout = Duration::from_secs(settings.llm.timeout_secs);
        let service = Arc::new(EmbeddingService::from_settings(&settings.embedding, &settings.secrets, timeout));
        let registry = querylab_llm::ProviderRegistry::from_settings(&settings.llm, &settings.secrets);
        Self::from_parts(service, registry.available(), settings)
    }

    pub fn top_k(&self) -> usize { self.top_k }

    /// Full score vector for one strategy, in document order.
    pub fn scores(&self, query: &str, docs: &[Document], mode: SearchMode, weight: HybridWeight) -> Scores {
        match mode {
            SearchMode::Lexical => self.lexical.score(query, docs),
            SearchMode::Semantic => self.semantic.score(query, docs),
            SearchMode::Hybrid => HybridScorer::new(self.semantic.as_ref(), self.lexical.as_ref()).score(query, docs, weight),
            SearchMode::Llm => self.judge.score(query, docs),
        }
    }

    pub fn rank(&self, query: &str, docs: &[Document], mode: SearchMode, weight: HybridWeight) -> Vec<ScoredResult> {
        self.column(query, docs, mode, weight).results
    }

    /// Ranked results of one strategy together with its method label, which
    /// is set even when there are no results.
    pub fn column(&self, query: &str, docs: &[Document], mode: SearchMode, weight: HybridWeight) -> Column {
        let scores = self.scores(query, docs, mode, weight);
        debug!("{} -> {}", mode, scores.method);
        Column::from_scores(mode, docs, &scores, self.top_k)
    }

    /// All four strategies in column order Lexical, Semantic, Hybrid, LLM.
    ///
    /// Lexical and semantic scores are computed once and reused for the blend.
    pub fn compare(&self, query: &str, docs: &[Document], weight: HybridWeight) -> Comparison {
        let lexical = self.lexical.score(query, docs);
        let semantic = self.semantic.score(query, docs);
        let hybrid = blend(&semantic, &lexical, weight);
        let llm = self.judge.score(query, docs);
        let columns = [(SearchMode::Lexical, lexical), (SearchMode::Semantic, semantic), (SearchMode::Hybrid, hybrid), (SearchMode::Llm, llm)]
            .into_iter()
            .map(|(mode, scores)| Column::from_scores(mode, docs, &scores, self.top_k))
            .collect();
        Comparison { query: query.to_string(), hybrid_weight: weight.into(), columns }
    }
}

/// Best `k` documents, score descending; equal scores keep collection order.
///
/// NaN scores count as 0.0.
pub fn top_k(docs: &[Document], scores: &Scores, k: usize) -> Vec<ScoredResult> {
    let values: Vec<f32> = scores.values.iter().map(|&s| if s.is_nan() { 0.0 } else { s }).collect();
    let mut order: Vec<usize> = (0..docs.len().min(values.len())).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));
    order
        .into_iter()
        .take(k)
        .map(|i| ScoredResult { document: docs[i].clone(), index: i, score: values[i], method: scores.method.clone() })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub mode: SearchMode,
    pub method: String,
    pub results: Vec<ScoredResult>,
}

/// Side-by-side results of every strategy for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub query: String,
    pub hybrid_weight: f32,
    pub columns: Vec<Column>,
}

impl Column {
    fn from_scores(mode: SearchMode, docs: &[Document], scores: &Scores, k: usize) -> Self {
        Column { mode, method: scores.method.clone(), results: top_k(docs, scores, k) }
    }
}

impl Comparison {
    pub fn column(&self, mode: SearchMode) -> Option<&Column> {
        self.columns.iter().find(|c| c.mode == mode)
    }

    /// Copy with results below `min_score` removed, as shown to the user.
    pub fn filtered(&self, min_score: f32) -> Comparison {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                mode: c.mode,
                method: c.method.clone(),
                results: c.results.iter().filter(|r| r.score >= min_score).cloned().collect(),
            })
            .collect();
        Comparison { query: self.query.clone(), hybrid_weight: self.hybrid_weight, columns }
    }
}
