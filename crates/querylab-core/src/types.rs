//! Domain types used by the scorers and the ranker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A searchable record supplied by the caller.
///
/// Documents carry no id: identity is the position within the collection
/// handed to the engine. Missing fields deserialize to empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub title: String,
    pub snippet: String,
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A document enriched with a strategy-specific score.
///
/// - `index`: position of the document in the scored collection
/// - `score`: higher is better; normalized to [0, 1] except for LLM ratings
/// - `method`: label of the scorer (and fallback path) that produced `score`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub document: Document,
    pub index: usize,
    pub score: f32,
    pub method: String,
}

/// The four retrieval strategies, in comparison-column order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Lexical,
    Semantic,
    Hybrid,
    #[serde(rename = "LLM")]
    Llm,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [Self::Lexical, Self::Semantic, Self::Hybrid, Self::Llm];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "Lexical",
            Self::Semantic => "Semantic",
            Self::Hybrid => "Hybrid",
            Self::Llm => "LLM",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(Self::Lexical),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            "llm" => Ok(Self::Llm),
            other => Err(Error::InvalidInput(format!(
                "unknown search mode '{other}' (expected Lexical, Semantic, Hybrid or LLM)"
            ))),
        }
    }
}

/// Share of the semantic signal in a hybrid blend, within [0, 1].
///
/// `0.0` is pure lexical, `1.0` pure semantic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct HybridWeight(f32);

impl HybridWeight {
    pub const DEFAULT: f32 = 0.6;

    pub fn new(weight: f32) -> Result<Self> {
        if weight.is_finite() && (0.0..=1.0).contains(&weight) {
            Ok(Self(weight))
        } else {
            Err(Error::InvalidConfig(format!("hybrid weight must be within [0, 1], got {weight}")))
        }
    }

    pub fn semantic(self) -> f32 {
        self.0
    }

    pub fn lexical(self) -> f32 {
        1.0 - self.0
    }

    pub fn blend(self, semantic: f32, lexical: f32) -> f32 {
        self.0 * semantic + (1.0 - self.0) * lexical
    }
}

impl Default for HybridWeight {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f32> for HybridWeight {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HybridWeight> for f32 {
    fn from(weight: HybridWeight) -> Self {
        weight.0
    }
}

/// One score per document, in collection order, plus the label of the
/// technique that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    pub values: Vec<f32>,
    pub method: String,
}

impl Scores {
    pub fn new(values: Vec<f32>, method: impl Into<String>) -> Self {
        Self { values, method: method.into() }
    }

    /// A flat, all-zero score vector for a strategy that could not run.
    pub fn zeros(len: usize, method: impl Into<String>) -> Self {
        Self { values: vec![0.0; len], method: method.into() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Trimmed query text; blank queries are rejected.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("query must not be empty".to_string()));
    }
    Ok(trimmed)
}
