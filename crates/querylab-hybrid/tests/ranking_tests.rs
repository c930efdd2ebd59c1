use std::sync::Arc;

use querylab_core::config::{EmbeddingBackend, Settings};
use querylab_core::data_processor::DataProcessor;
use querylab_core::sample::sample_documents;
use querylab_core::traits::Scorer;
use querylab_core::types::{Document, HybridWeight, Scores, SearchMode};
use querylab_embed::{EmbeddingService, HashEmbedder, ResourceManager};
use querylab_hybrid::{top_chunks, Ranker, SemanticScorer};
use querylab_llm::judge::METHOD_NO_PROVIDER;
use querylab_llm::LlmJudge;
use querylab_text::LexicalScorer;

/// Returns the same scores regardless of the query.
struct FixedScorer(Vec<f32>);

impl Scorer for FixedScorer {
    fn score(&self, _query: &str, docs: &[Document]) -> Scores {
        Scores::new(self.0.iter().copied().take(docs.len()).collect(), "fixed")
    }
}

fn service() -> Arc<EmbeddingService> {
    Arc::new(EmbeddingService::new(Arc::new(ResourceManager::with_embedder(Arc::new(HashEmbedder::new(384))))))
}

fn ranker() -> Ranker {
    Ranker::new(
        Box::new(LexicalScorer::new()),
        Box::new(SemanticScorer::new(service())),
        Box::new(LlmJudge::new(Vec::new())),
    )
}

fn weight(w: f32) -> HybridWeight {
    HybridWeight::new(w).unwrap()
}

fn docs_named(n: usize) -> Vec<Document> {
    (0..n).map(|i| Document { title: format!("doc {i}"), ..Document::default() }).collect()
}

#[test]
fn rank_returns_at_most_five_sorted_with_stable_ties() {
    let docs = docs_named(7);
    let fixed = || Box::new(FixedScorer(vec![0.5, 0.9, 0.5, 0.9, 0.1, 0.5, 0.7])) as Box<dyn Scorer>;
    let ranker = Ranker::new(fixed(), fixed(), fixed());
    let results = ranker.rank("q", &docs, SearchMode::Lexical, HybridWeight::default());
    let order: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![1, 3, 6, 0, 2]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.method == "fixed"));
    assert_eq!(results[0].document.title, "doc 1");
}

#[test]
fn nan_scores_rank_as_zero() {
    let docs = docs_named(3);
    let nan = || Box::new(FixedScorer(vec![f32::NAN, 0.2, 0.0])) as Box<dyn Scorer>;
    let results = Ranker::new(nan(), nan(), nan()).rank("q", &docs, SearchMode::Semantic, HybridWeight::default());
    let order: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![1, 0, 2]);
    assert_eq!(results[1].score, 0.0);
}

#[test]
fn short_collections_return_every_document() {
    let docs = sample_documents()[..3].to_vec();
    let results = ranker().rank("bm25", &docs, SearchMode::Lexical, HybridWeight::default());
    assert_eq!(results.len(), 3);
}

#[test]
fn hybrid_extremes_match_single_strategies() {
    let docs = sample_documents();
    let ranker = ranker();
    for query in ["elasticsearch performance", "hybrid retrieval", "semantic vector search"] {
        let lexical = ranker.scores(query, &docs, SearchMode::Lexical, HybridWeight::default());
        let semantic = ranker.scores(query, &docs, SearchMode::Semantic, HybridWeight::default());
        let pure_lexical = ranker.scores(query, &docs, SearchMode::Hybrid, weight(0.0));
        let pure_semantic = ranker.scores(query, &docs, SearchMode::Hybrid, weight(1.0));
        assert_eq!(pure_lexical.values, lexical.values, "{query}");
        assert_eq!(pure_semantic.values, semantic.values, "{query}");
    }
}

#[test]
fn hybrid_label_encodes_weight() {
    let scores = ranker().scores("bm25", &sample_documents(), SearchMode::Hybrid, weight(0.6));
    assert_eq!(scores.method, "Hybrid (0.60*Semantic (Hash embedding (d384)) + 0.40*BM25 (Tantivy))");
}

fn ranker_without_embeddings() -> Ranker {
    let broken = ResourceManager::with_factory(|| Err(anyhow::anyhow!("no model dir")));
    Ranker::new(
        Box::new(LexicalScorer::new()),
        Box::new(SemanticScorer::new(Arc::new(EmbeddingService::new(Arc::new(broken))))),
        Box::new(LlmJudge::new(Vec::new())),
    )
}

#[test]
fn semantic_without_backend_is_full_length_zeros() {
    let docs = sample_documents();
    let ranker = ranker_without_embeddings();
    let scores = ranker.scores("bm25 ranking", &docs, SearchMode::Semantic, HybridWeight::default());
    assert_eq!(scores.values, vec![0.0; docs.len()]);
    assert!(scores.method.contains("unavailable"), "{}", scores.method);

    let results = ranker.rank("bm25 ranking", &docs, SearchMode::Semantic, HybridWeight::default());
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.score == 0.0 && r.method.contains("unavailable")));
}

#[test]
fn hybrid_label_reports_degraded_semantic_half() {
    let docs = sample_documents();
    let ranker = ranker_without_embeddings();
    let hybrid = ranker.scores("bm25 ranking", &docs, SearchMode::Hybrid, weight(0.6));
    let lexical = ranker.scores("bm25 ranking", &docs, SearchMode::Lexical, HybridWeight::default());
    assert!(hybrid.method.starts_with("Hybrid (0.60*Semantic (unavailable:"), "{}", hybrid.method);
    assert!(hybrid.method.ends_with("+ 0.40*BM25 (Tantivy))"), "{}", hybrid.method);
    for (h, l) in hybrid.values.iter().zip(&lexical.values) {
        assert!((h - 0.4 * l).abs() < 1e-6);
    }
}

#[test]
fn empty_column_still_has_a_method() {
    let ranker = ranker();
    for mode in SearchMode::ALL {
        let column = ranker.column("bm25", &[], mode, HybridWeight::default());
        assert!(column.results.is_empty());
        assert!(!column.method.is_empty(), "{mode}");
    }
}

#[test]
fn query_equal_to_title_scores_one() {
    let docs = sample_documents();
    let scores = ranker().scores("Intro to BM25", &docs, SearchMode::Semantic, HybridWeight::default());
    assert!((scores.values[1] - 1.0).abs() < 1e-5, "got {}", scores.values[1]);
    assert!(scores.values.iter().all(|s| (-1.0..=1.0 + 1e-6).contains(s)));
    assert_eq!(scores.method, "Semantic (Hash embedding (d384))");
}

#[test]
fn empty_collection_is_empty_for_every_mode() {
    let ranker = ranker();
    for mode in SearchMode::ALL {
        assert!(ranker.rank("anything", &[], mode, HybridWeight::default()).is_empty(), "{mode}");
    }
}

#[test]
fn llm_without_provider_is_all_zero() {
    let docs = sample_documents();
    let results = ranker().rank("bm25 ranking", &docs, SearchMode::Llm, HybridWeight::default());
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.score == 0.0 && r.method == METHOD_NO_PROVIDER));
    let order: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}

#[test]
fn lexical_and_semantic_are_repeatable() {
    let docs = sample_documents();
    let ranker = ranker();
    for mode in [SearchMode::Lexical, SearchMode::Semantic] {
        let a = ranker.scores("vector search at scale", &docs, mode, HybridWeight::default());
        let b = ranker.scores("vector search at scale", &docs, mode, HybridWeight::default());
        let bits = |s: &Scores| s.values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.method, b.method);
    }
}

#[test]
fn bm25_ranking_puts_intro_first() {
    let results = ranker().rank("bm25 ranking", &sample_documents(), SearchMode::Lexical, HybridWeight::default());
    assert_eq!(results[0].document.title, "Intro to BM25");
}

#[test]
fn elasticsearch_performance_hybrid_top_three() {
    let results = ranker().rank("elasticsearch performance", &sample_documents(), SearchMode::Hybrid, weight(0.6));
    assert!(!results.is_empty());
    assert!(results.iter().take(3).any(|r| r.document.title == "Elasticsearch Tuning Guide"));
}

#[test]
fn compare_runs_columns_in_fixed_order() {
    let docs = sample_documents();
    let ranker = ranker();
    let comparison = ranker.compare("hybrid retrieval", &docs, weight(0.6));
    let modes: Vec<SearchMode> = comparison.columns.iter().map(|c| c.mode).collect();
    assert_eq!(modes, SearchMode::ALL.to_vec());
    for mode in SearchMode::ALL {
        let column = comparison.column(mode).unwrap();
        assert_eq!(column.results, ranker.rank("hybrid retrieval", &docs, mode, weight(0.6)));
    }
}

#[test]
fn filtered_comparison_drops_low_scores_only() {
    let comparison = ranker().compare("bm25 ranking", &sample_documents(), HybridWeight::default());
    let shown = comparison.filtered(0.30);
    for (full, kept) in comparison.columns.iter().zip(&shown.columns) {
        assert!(kept.results.iter().all(|r| r.score >= 0.30));
        assert_eq!(kept.results.len(), full.results.iter().filter(|r| r.score >= 0.30).count());
    }
    assert!(shown.column(SearchMode::Llm).unwrap().results.is_empty());
    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["columns"][3]["mode"], "LLM");
}

#[test]
fn ranker_from_settings_with_fake_backend() {
    let mut settings = Settings::default();
    settings.embedding.backend = EmbeddingBackend::Fake;
    settings.search.top_k = 2;
    let ranker = Ranker::from_settings(&settings);
    assert_eq!(ranker.top_k(), 2);
    let results = ranker.rank("bm25 ranking", &sample_documents(), SearchMode::Semantic, HybridWeight::default());
    assert_eq!(results.len(), 2);
}

#[test]
fn job_post_chunks_match_question() {
    let post = "We are hiring a search engineer to own relevance tuning.\n\n\
                Benefits include remote work and a learning budget.\n\n\
                You will build vector search and BM25 pipelines for customers.";
    let chunks = DataProcessor::new().chunk_job_post(post);
    let service = service();
    let top = top_chunks(&service, "vector search pipelines", &chunks, 3).unwrap();
    assert!(!top.is_empty() && top.len() <= 3);
    assert!(top[0].text.contains("vector search"));
    assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(top_chunks(&service, "anything", &[], 3).unwrap().is_empty());
}
