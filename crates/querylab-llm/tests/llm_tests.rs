use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use querylab_core::config::{LlmSettings, Secrets};
use querylab_core::sample::sample_documents;
use querylab_core::traits::Scorer;
use querylab_core::types::SearchMode;
use querylab_llm::error::{LlmError, Result};
use querylab_llm::explain::{explain_prompt, LLM_UNAVAILABLE};
use querylab_llm::judge::{judge_prompt, METHOD_ALL_FAILED, METHOD_NO_PROVIDER};
use querylab_llm::role::insight_prompt;
use querylab_llm::{complete_first, CompletionOptions, Explainer, HealthStatus, LlmJudge, LlmProvider, ProviderRegistry, RoleAssistant};

/// Replays canned replies in order; `Err` entries simulate failed calls.
struct Scripted {
    name: &'static str,
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(name: &'static str, replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self { name, replies: Mutex::new(replies.into()), calls: AtomicUsize::new(0) })
    }

    fn answering(name: &'static str, replies: &[&str]) -> Arc<Self> {
        Self::new(name, replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Self::new(name, Vec::new())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for Scripted {
    fn name(&self) -> &str { self.name }
    fn model(&self) -> &str { "test-model" }

    fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api { status: 401, body: "invalid key".into() }))
    }
}

fn as_dyn(providers: &[&Arc<Scripted>]) -> Vec<Arc<dyn LlmProvider>> {
    providers.iter().map(|p| Arc::clone(*p) as Arc<dyn LlmProvider>).collect()
}

#[test]
fn no_provider_scores_zero_and_says_so() {
    let docs = sample_documents();
    let scores = LlmJudge::new(Vec::new()).score("bm25 ranking", &docs);
    assert_eq!(scores.values, vec![0.0; docs.len()]);
    assert_eq!(scores.method, METHOD_NO_PROVIDER);
}

#[test]
fn first_answering_provider_scores_whole_batch() {
    let docs = sample_documents();
    let openai = Scripted::failing("OpenAI");
    let cohere = Scripted::answering("Cohere", &["0.9", "0.1 not really", "oops", "0.5", "1.0"]);
    let groq = Scripted::answering("Groq", &["0.3"; 5]);
    let judge = LlmJudge::new(as_dyn(&[&openai, &cohere, &groq]));

    let scores = judge.score("bm25 ranking", &docs);
    assert_eq!(scores.values, vec![0.9, 0.1, 0.0, 0.5, 1.0]);
    assert_eq!(scores.method, "LLM (Cohere test-model)");
    assert_eq!(openai.calls(), 1, "a failed provider is not retried within the batch");
    assert_eq!(cohere.calls(), 5);
    assert_eq!(groq.calls(), 0, "no mixing after the commit");
}

#[test]
fn failures_after_commit_score_zero_without_switching() {
    let docs = sample_documents();
    let openai = Scripted::new(
        "OpenAI",
        vec![Ok("0.8".into()), Err(LlmError::Timeout), Ok("0.6".into()), Err(LlmError::Timeout), Ok("0.2".into())],
    );
    let cohere = Scripted::answering("Cohere", &["1.0"; 5]);
    let scores = LlmJudge::new(as_dyn(&[&openai, &cohere])).score("q", &docs);
    assert_eq!(scores.values, vec![0.8, 0.0, 0.6, 0.0, 0.2]);
    assert_eq!(cohere.calls(), 0);
}

#[test]
fn all_providers_failing_gives_zeros() {
    let docs = sample_documents();
    let a = Scripted::failing("OpenAI");
    let b = Scripted::failing("Gemini");
    let scores = LlmJudge::new(as_dyn(&[&a, &b])).score("q", &docs);
    assert_eq!(scores.values, vec![0.0; docs.len()]);
    assert_eq!(scores.method, METHOD_ALL_FAILED);
    assert_eq!(a.calls() + b.calls(), 2, "each provider is tried once per batch");
}

#[test]
fn empty_batch_makes_no_calls() {
    let p = Scripted::answering("OpenAI", &["1.0"]);
    let scores = LlmJudge::new(as_dyn(&[&p])).score("q", &[]);
    assert!(scores.values.is_empty());
    assert_eq!(p.calls(), 0);
}

#[test]
fn judge_prompt_carries_query_title_and_snippet() {
    let doc = &sample_documents()[1];
    let prompt = judge_prompt("bm25 ranking", doc);
    assert!(prompt.starts_with("Given the query: 'bm25 ranking', rate the relevance"));
    assert!(prompt.contains(&format!("Title: {}", doc.title)));
    assert!(prompt.contains(&format!("Snippet: {}", doc.snippet)));
}

#[test]
fn explanation_uses_first_working_provider() {
    let broken = Scripted::failing("OpenAI");
    let cohere = Scripted::answering("Cohere", &["Lexical search matches terms. It is fast. It misses synonyms."]);
    let explainer = Explainer::new(as_dyn(&[&broken, &cohere]));
    let fragments: Vec<String> = explainer.explain(SearchMode::Lexical).into_iter().collect();
    assert_eq!(
        fragments,
        vec!["Lexical search matches terms.", "It is fast.", "It misses synonyms."]
    );
}

#[test]
fn explanation_reports_errors_then_fallback() {
    let a = Scripted::failing("OpenAI");
    let b = Scripted::failing("Groq");
    let fragments: Vec<String> = Explainer::new(as_dyn(&[&a, &b])).explain(SearchMode::Hybrid).into_iter().collect();
    assert_eq!(fragments.len(), 3);
    assert!(fragments[0].starts_with("[OpenAI error:"));
    assert!(fragments[1].starts_with("[Groq error:"));
    assert_eq!(fragments[2], LLM_UNAVAILABLE);
}

#[test]
fn empty_explanation_falls_through_to_next_provider() {
    let silent = Scripted::answering("OpenAI", &["  "]);
    let gemini = Scripted::answering("Gemini", &["Semantic search compares embeddings."]);
    let fragments: Vec<String> = Explainer::new(as_dyn(&[&silent, &gemini])).explain(SearchMode::Semantic).into_iter().collect();
    assert_eq!(fragments, vec!["Semantic search compares embeddings."]);
}

#[test]
fn dropping_the_receiver_ends_the_stream() {
    let p = Scripted::answering("Cohere", &["One. Two. Three. Four."]);
    let rx = Explainer::new(as_dyn(&[&p])).explain(SearchMode::Llm);
    assert_eq!(rx.recv().unwrap(), "One.");
    drop(rx);
}

#[test]
fn refusing_sink_stops_after_one_fragment() {
    let p = Scripted::answering("Cohere", &["One. Two. Three. Four."]);
    let mut seen = Vec::new();
    Explainer::new(as_dyn(&[&p])).explain_with(SearchMode::Llm, &mut |f: String| {
        seen.push(f);
        false
    });
    assert_eq!(seen, vec!["One."]);
}

#[test]
fn explain_prompt_names_the_mode() {
    assert!(explain_prompt(SearchMode::Llm).contains("how a 'LLM' search mode works"));
}

#[test]
fn registry_without_keys_reports_missing() {
    let registry = ProviderRegistry::from_settings(&LlmSettings::default(), &Secrets::default());
    assert!(registry.available().is_empty());
    let reports = registry.health_check();
    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["OpenAI", "Cohere", "Groq", "Gemini"]);
    assert!(reports.iter().all(|r| r.status == HealthStatus::MissingKey));
}

#[test]
fn registry_keeps_priority_order_of_configured_providers() {
    let secrets = Secrets { groq_api_key: Some("gsk".into()), cohere_api_key: Some("co".into()), ..Secrets::default() };
    let registry = ProviderRegistry::from_settings(&LlmSettings::default(), &secrets);
    let names: Vec<String> = registry.available().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["Cohere", "Groq"]);
}

#[test]
fn health_check_reports_replies_and_failures() {
    let ok = Scripted::answering("OpenAI", &[" Hello World "]);
    let bad = Scripted::failing("Cohere");
    let reports = ProviderRegistry::from_providers(as_dyn(&[&ok, &bad])).health_check();
    assert_eq!(reports[0].status, HealthStatus::Ok("Hello World".into()));
    assert!(reports[0].is_ok());
    assert!(matches!(reports[1].status, HealthStatus::Failed(ref e) if e.contains("401")));
}

#[test]
fn complete_first_skips_failures_and_reports_provider() {
    let a = Scripted::failing("OpenAI");
    let b = Scripted::answering("Groq", &["ok"]);
    let reply = complete_first(&as_dyn(&[&a, &b]), "hi", &CompletionOptions::new(10, 0.0)).unwrap();
    assert_eq!(reply.text, "ok");
    assert_eq!(reply.provider, "Groq test-model");
}

#[test]
fn complete_first_without_providers_is_not_configured() {
    let err = complete_first(&[], "hi", &CompletionOptions::new(10, 0.0)).unwrap_err();
    assert!(matches!(err, LlmError::NotConfigured(_)));
}

#[test]
fn role_summary_is_parsed_from_first_answer() {
    let broken = Scripted::failing("OpenAI");
    let cohere = Scripted::answering(
        "Cohere",
        &["Responsibilities:\n- Own the search roadmap\n\nSkills and requirements:\n- Rust\n- Relevance tuning"],
    );
    let summary = RoleAssistant::new(as_dyn(&[&broken, &cohere])).summarize("We are hiring.").unwrap();
    assert_eq!(summary.responsibilities, "- Own the search roadmap");
    assert_eq!(summary.skills, "- Rust\n- Relevance tuning");
    assert!(summary.product_areas.is_empty());
}

#[test]
fn insight_and_fit_use_the_provider_chain() {
    let p = Scripted::answering("Gemini", &["Start with a listening tour.", "- Strong search background"]);
    let assistant = RoleAssistant::new(as_dyn(&[&p]));
    let chunks = vec!["Own relevance.".to_string(), "Ship hybrid search.".to_string()];
    assert_eq!(assistant.insight("30-60-90 day plan", &chunks).unwrap().text, "Start with a listening tour.");
    assert_eq!(assistant.fit_summary("resume", "post").unwrap().text, "- Strong search background");
    assert!(RoleAssistant::new(Vec::new()).summarize("post").is_err());
    let prompt = insight_prompt("30-60-90 day plan", &chunks);
    assert!(prompt.starts_with("Job context:\nOwn relevance.\n\nShip hybrid search."));
    assert!(prompt.contains("Prompt: 30-60-90 day plan"));
}
