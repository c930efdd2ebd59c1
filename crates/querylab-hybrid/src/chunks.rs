use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;

use querylab_embed::EmbeddingService;

use crate::semantic::cosine;

pub const DEFAULT_TOP_CHUNKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkMatch {
    pub index: usize,
    pub score: f32,
    pub text: String,
}

/// Chunks most similar to `question`, best first.
pub fn top_chunks(service: &EmbeddingService, question: &str, chunks: &[String], k: usize) -> Result<Vec<ChunkMatch>> {
    if chunks.is_empty() || k == 0 {
        return Ok(Vec::new());
    }
    let texts: Vec<String> = std::iter::once(question.to_string()).chain(chunks.iter().cloned()).collect();
    let embedded = service.embed(&texts)?;
    let (q, rest) = embedded.vectors.split_at(1);
    let mut matches: Vec<ChunkMatch> = rest
        .iter()
        .zip(chunks)
        .enumerate()
        .map(|(index, (v, text))| ChunkMatch { index, score: cosine(v, &q[0]), text: text.clone() })
        .collect();
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(k);
    Ok(matches)
}
