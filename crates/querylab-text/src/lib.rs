//! querylab-text
//!
//! Lexical (BM25) scoring. `LexicalScorer` prefers an in-memory tantivy index
//! and falls back to the in-process Okapi implementation when the index
//! cannot be built or queried.

pub mod tantivy_utils;
pub mod index;
pub mod okapi;
pub mod lexical;

pub use index::TantivyScorer;
pub use lexical::{normalize_by_max, IndexScorer, LexicalScorer};
pub use okapi::OkapiBm25;
