//! Query and document normalization shared by the lexical scorers.

/// Lowercase `text` and split it on Unicode whitespace.
///
/// Punctuation is kept attached to its word, so `"BM25,"` and `"bm25"` are
/// distinct tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}
