//! `querylab`: compare lexical, semantic, hybrid and LLM-judged retrieval
//! over a small document collection.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use querylab_core::config::{Config, Settings};
use querylab_core::data_processor::DataProcessor;
use querylab_core::sample::{sample_documents, sample_documents_json, SAMPLE_QUERIES};
use querylab_core::types::{validate_query, Document, HybridWeight, ScoredResult, SearchMode};
use querylab_embed::EmbeddingService;
use querylab_hybrid::chunks::DEFAULT_TOP_CHUNKS;
use querylab_hybrid::{top_chunks, Column, Ranker};
use querylab_llm::role::grounded_answer;
use querylab_llm::{Explainer, ProviderRegistry, RoleAssistant, RoleSummary};

const PREVIEW_CHARS: usize = 100;

#[derive(Parser)]
#[command(name = "querylab", about = "Side-by-side comparison of retrieval strategies", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all four strategies and print them side by side
    Compare {
        query: String,

        /// Share of the semantic score in the hybrid blend (0.0 to 1.0)
        #[arg(short, long)]
        weight: Option<f32>,

        /// JSON array of documents; defaults to the built-in sample
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Hide results scoring below this value
        #[arg(long)]
        min_score: Option<f32>,

        /// Stream an LLM explanation of each strategy
        #[arg(long)]
        explain: bool,

        /// Print the unfiltered comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank documents with a single strategy
    Rank {
        query: String,

        /// Lexical, Semantic, Hybrid or LLM
        #[arg(short, long, default_value = "Hybrid")]
        mode: SearchMode,

        #[arg(short, long)]
        weight: Option<f32>,

        #[arg(short, long)]
        docs: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print the built-in sample documents as JSON
    SampleData {
        /// Print the suggested sample queries instead
        #[arg(long)]
        queries: bool,
    },

    /// Check which LLM providers are configured and answering
    Providers,

    /// Find the job-post passages closest to a question or a resume
    Chunks {
        /// Plain-text job post
        #[arg(short, long)]
        file: PathBuf,

        #[arg(required_unless_present = "resume")]
        question: Option<String>,

        /// Plain-text resume to match against the post instead of a question
        #[arg(short, long)]
        resume: Option<PathBuf>,

        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_CHUNKS)]
        top_k: usize,
    },

    /// Summarize a job post, or ask the LLM about it
    Role {
        /// Plain-text job post
        #[arg(short, long)]
        file: PathBuf,

        /// Strategic question answered with the post as context
        #[arg(long, conflicts_with = "fit")]
        insight: Option<String>,

        /// Plain-text resume for a fit summary
        #[arg(long)]
        fit: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load()?;
    let settings = config.settings()?;

    match cli.command {
        Commands::Compare { query, weight, docs, min_score, explain, json } => {
            let query = validate_query(&query)?;
            let docs = load_docs(docs.as_deref())?;
            let weight = resolve_weight(&settings, weight)?;
            let ranker = Ranker::from_settings(&settings);
            let comparison = ranker.compare(query, &docs, weight);
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
                return Ok(());
            }
            let shown = comparison.filtered(min_score.unwrap_or(settings.search.min_score));
            println!("Query: {}  ({} documents, hybrid weight {:.2})", query, docs.len(), f32::from(weight));
            let explainer = explain.then(|| explainer(&settings));
            for column in &shown.columns {
                print_column(column);
                if let Some(explainer) = &explainer {
                    stream_explanation(explainer, column.mode)?;
                }
            }
        }
        Commands::Rank { query, mode, weight, docs, json } => {
            let query = validate_query(&query)?;
            let docs = load_docs(docs.as_deref())?;
            let weight = resolve_weight(&settings, weight)?;
            let column = Ranker::from_settings(&settings).column(query, &docs, mode, weight);
            if json {
                println!("{}", serde_json::to_string_pretty(&column)?);
            } else {
                print_column(&column);
            }
        }
        Commands::SampleData { queries: true } => {
            for query in SAMPLE_QUERIES {
                println!("{query}");
            }
        }
        Commands::SampleData { queries: false } => println!("{}", sample_documents_json()?),
        Commands::Providers => {
            let reports = ProviderRegistry::from_settings(&settings.llm, &settings.secrets).health_check();
            for report in &reports {
                println!("{report}");
            }
            let ok = reports.iter().filter(|r| r.is_ok()).count();
            println!("{}/{} providers working", ok, reports.len());
        }
        Commands::Chunks { file, question, resume, top_k } => {
            let processor = DataProcessor::new();
            let chunks = processor.chunk_job_post(&processor.read_text_file(&file)?);
            info!("{} chunks from {}", chunks.len(), file.display());
            let timeout = Duration::from_secs(settings.llm.timeout_secs);
            let service = EmbeddingService::from_settings(&settings.embedding, &settings.secrets, timeout);
            let (target, heading) = match (&resume, &question) {
                (Some(path), _) => (processor.read_text_file(path)?, "Chunks matching your resume"),
                (None, Some(q)) => (validate_query(q)?.to_string(), "Retrieved chunks"),
                (None, None) => anyhow::bail!("give a question or --resume"),
            };
            if target.trim().is_empty() {
                anyhow::bail!("no text to match against the job post");
            }
            let matches = top_chunks(&service, &target, &chunks, top_k)?;
            println!("{heading}:\n");
            if matches.is_empty() {
                println!("No results.");
            }
            for (rank, m) in matches.iter().enumerate() {
                println!("{}. [{:.3}] chunk {}\n{}\n", rank + 1, m.score, m.index + 1, m.text);
            }
            if resume.is_none() {
                let context: Vec<String> = matches.into_iter().map(|m| m.text).collect();
                println!("---\n{}", grounded_answer(&target, &context));
            }
        }
        Commands::Role { file, insight, fit } => {
            let processor = DataProcessor::new();
            let post = processor.read_text_file(&file)?;
            let registry = ProviderRegistry::from_settings(&settings.llm, &settings.secrets);
            let assistant = RoleAssistant::new(registry.available());
            if let Some(prompt) = insight {
                let prompt = validate_query(&prompt)?;
                let reply = assistant.insight(prompt, &processor.chunk_job_post(&post))?;
                println!("{}\n\n({})", reply.text.trim(), reply.provider);
            } else if let Some(path) = fit {
                let resume = processor.read_text_file(&path)?;
                if resume.trim().is_empty() {
                    anyhow::bail!("resume {} has no text", path.display());
                }
                let reply = assistant.fit_summary(&resume, &post)?;
                println!("{}\n\n({})", reply.text.trim(), reply.provider);
            } else {
                print_summary(&assistant.summarize(&post)?);
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &RoleSummary) {
    for (heading, body) in [
        ("Responsibilities", &summary.responsibilities),
        ("Key Product Areas", &summary.product_areas),
        ("Skills & Requirements", &summary.skills),
        ("Metrics / KPIs", &summary.metrics),
    ] {
        if !body.is_empty() {
            println!("{heading}:\n{body}\n");
        }
    }
}

fn load_docs(path: Option<&Path>) -> Result<Vec<Document>> {
    match path {
        Some(path) => Ok(DataProcessor::new().load_documents_file(path)?),
        None => Ok(sample_documents()),
    }
}

fn resolve_weight(settings: &Settings, flag: Option<f32>) -> Result<HybridWeight> {
    Ok(match flag {
        Some(w) => HybridWeight::new(w)?,
        None => settings.hybrid_weight()?,
    })
}

fn explainer(settings: &Settings) -> Explainer {
    let registry = ProviderRegistry::from_settings(&settings.llm, &settings.secrets);
    Explainer::from_settings(registry.available(), &settings.llm)
}

fn print_column(column: &Column) {
    println!("\n== {} :: {} ==", column.mode, column.method);
    if column.results.is_empty() {
        println!("No results.");
        return;
    }
    for (rank, result) in column.results.iter().enumerate() {
        print_result(rank + 1, result);
    }
}

fn print_result(rank: usize, result: &ScoredResult) {
    let doc = &result.document;
    println!("{:>2}. [{:.3}] {}", rank, result.score, doc.title);
    let meta: Vec<&str> = [doc.author.as_str(), doc.date.as_str(), doc.kind.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !meta.is_empty() {
        println!("    {}", meta.join(" | "));
    }
    println!("    {}", preview(&doc.snippet));
}

fn preview(snippet: &str) -> String {
    let mut out: String = snippet.chars().take(PREVIEW_CHARS).collect();
    if snippet.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

fn stream_explanation(explainer: &Explainer, mode: SearchMode) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "  > ")?;
    let mut last = ' ';
    for fragment in explainer.explain(mode) {
        // Sentence fragments arrive without separators, token deltas with them.
        if matches!(last, '.' | ']') && !fragment.starts_with(char::is_whitespace) {
            write!(stdout, " ")?;
        }
        write!(stdout, "{fragment}")?;
        stdout.flush()?;
        last = fragment.chars().last().unwrap_or(last);
    }
    writeln!(stdout)?;
    Ok(())
}
