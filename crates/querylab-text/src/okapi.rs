//! In-process BM25 Okapi scorer.
//!
//! ```text
//! score(D, Q) = Σ idf(q) · f(q,D)·(k1+1) / (f(q,D) + k1·(1 − b + b·|D|/avgdl))
//! idf(q)      = ln(N − n(q) + 0.5) − ln(n(q) + 0.5)
//! ```
//!
//! Terms that occur in more than half of the corpus get a negative idf; those
//! are replaced by `epsilon · mean(idf)`. Query terms absent from the corpus
//! contribute nothing.

use std::collections::HashMap;

use querylab_core::tokenize::tokenize;
use querylab_core::types::Document;

#[derive(Debug, Clone)]
pub struct OkapiBm25 {
    pub k1: f32,
    pub b: f32,
    pub epsilon: f32,
}

impl Default for OkapiBm25 {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

struct Corpus {
    doc_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f32,
    idf: HashMap<String, f32>,
}

impl OkapiBm25 {
    /// Raw (unnormalized) scores of `query` against each document snippet.
    pub fn raw_scores(&self, query: &str, docs: &[Document]) -> Vec<f32> {
        if docs.is_empty() { return Vec::new(); }
        let corpus = self.build(docs);
        if corpus.avgdl <= 0.0 { return vec![0.0; docs.len()]; }

        let query_tokens = tokenize(query);
        corpus
            .doc_freqs
            .iter()
            .zip(&corpus.doc_lens)
            .map(|(freqs, &len)| {
                let norm = self.k1 * (1.0 - self.b + self.b * len as f32 / corpus.avgdl);
                query_tokens
                    .iter()
                    .map(|q| {
                        let tf = freqs.get(q).copied().unwrap_or(0) as f32;
                        let idf = corpus.idf.get(q).copied().unwrap_or(0.0);
                        idf * (tf * (self.k1 + 1.0) / (tf + norm))
                    })
                    .sum()
            })
            .collect()
    }

    fn build(&self, docs: &[Document]) -> Corpus {
        let mut doc_freqs = Vec::with_capacity(docs.len());
        let mut doc_lens = Vec::with_capacity(docs.len());
        let mut containing: HashMap<String, usize> = HashMap::new();
        for d in docs {
            let tokens = tokenize(&d.snippet);
            doc_lens.push(tokens.len());
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for t in tokens { *freqs.entry(t).or_insert(0) += 1; }
            for term in freqs.keys() { *containing.entry(term.clone()).or_insert(0) += 1; }
            doc_freqs.push(freqs);
        }

        let n = docs.len() as f32;
        let avgdl = doc_lens.iter().sum::<usize>() as f32 / n;
        let mut idf: HashMap<String, f32> = containing
            .into_iter()
            .map(|(term, df)| {
                let df = df as f32;
                (term, (n - df + 0.5).ln() - (df + 0.5).ln())
            })
            .collect();
        if !idf.is_empty() {
            let floor = self.epsilon * idf.values().sum::<f32>() / idf.len() as f32;
            for v in idf.values_mut() {
                if *v < 0.0 { *v = floor; }
            }
        }
        Corpus { doc_freqs, doc_lens, avgdl, idf }
    }
}
