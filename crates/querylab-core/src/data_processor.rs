use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Document;

/// Upper bound for an uploaded document set.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Paragraphs are merged while the running chunk stays below this many characters.
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: 350 }
    }
}

/// Turns caller-provided inputs into the records the engine consumes.
#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_chunking(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    /// Parse an uploaded JSON document set.
    ///
    /// Only the outer shape is validated: the payload must be a JSON array.
    /// Entries that are not objects, or lack fields, become documents with
    /// empty values instead of failing the upload.
    pub fn parse_documents(&self, raw: &str) -> Result<Vec<Document>> {
        if raw.len() > MAX_UPLOAD_BYTES {
            return Err(Error::InvalidInput(format!(
                "document set is {} bytes, the limit is {} bytes",
                raw.len(),
                MAX_UPLOAD_BYTES
            )));
        }
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid JSON format: {e}")))?;
        let Value::Array(items) = value else {
            return Err(Error::InvalidInput(format!(
                "expected a JSON array of documents, got {}",
                json_kind(&value)
            )));
        };
        let docs: Vec<Document> = items.iter().map(document_from_value).collect();
        info!("Loaded {} documents", docs.len());
        Ok(docs)
    }

    pub fn load_documents_file(&self, path: &Path) -> Result<Vec<Document>> {
        let meta = fs::metadata(path).map_err(|e| Error::NotFound(format!("{}: {e}", path.display())))?;
        if meta.len() > MAX_UPLOAD_BYTES as u64 {
            return Err(Error::InvalidInput(format!(
                "{} is {} bytes, the limit is {} bytes",
                path.display(),
                meta.len(),
                MAX_UPLOAD_BYTES
            )));
        }
        let raw = self.read_file_content(path)?;
        self.parse_documents(&raw)
    }

    /// Split a job posting into paragraph-aligned chunks.
    ///
    /// Paragraphs are separated by blank lines and greedily merged (joined by
    /// a blank line) while the chunk stays under `max_chars`. A paragraph that
    /// is longer than the limit on its own becomes a single chunk.
    pub fn chunk_job_post(&self, text: &str) -> Vec<String> {
        let paragraphs = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty());
        let mut chunks = Vec::new();
        let mut current = String::new();
        for paragraph in paragraphs {
            if current.chars().count() + paragraph.chars().count() < self.chunking_config.max_chars {
                if !current.is_empty() { current.push_str("\n\n"); }
                current.push_str(paragraph);
            } else {
                if !current.is_empty() { chunks.push(std::mem::take(&mut current)); }
                current = paragraph.to_string();
            }
        }
        if !current.is_empty() { chunks.push(current); }
        debug!("Chunked job post into {} chunks", chunks.len());
        chunks
    }

    pub fn read_text_file(&self, path: &Path) -> Result<String> {
        self.read_file_content(path)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => {
                let bytes = fs::read(file_path).map_err(|e| Error::NotFound(format!("{}: {e}", file_path.display())))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
        }
    }
}

fn document_from_value(value: &Value) -> Document {
    let text = |key: &str| value.get(key).map(value_to_string).unwrap_or_default();
    let tags = match value.get("tags") {
        Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_to_string(other)],
    };
    Document {
        title: text("title"),
        snippet: text("snippet"),
        date: text("date"),
        author: text("author"),
        tags,
        kind: text("type"),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
