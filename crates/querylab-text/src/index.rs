use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexWriter, TantivyDocument, Term};

use querylab_core::types::Document;

use crate::tantivy_utils::{build_schema, register_tokenizer, POSITION_FIELD, SNIPPET_FIELD};

/// A throwaway in-RAM tantivy index over the snippets of one document batch.
pub struct TantivyScorer {
	index: Index,
	snippet_field: Field,
	position_field: Field,
	doc_count: usize,
}

impl TantivyScorer {
	/// Index every document's snippet, keeping its position in the batch.
	pub fn build(docs: &[Document]) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let snippet_field = schema.get_field(SNIPPET_FIELD)?;
		let position_field = schema.get_field(POSITION_FIELD)?;

		// A single indexing thread keeps the whole batch in one segment.
		let mut index_writer: IndexWriter<TantivyDocument> = index.writer_with_num_threads(1, 50_000_000)?;
		for (position, d) in docs.iter().enumerate() {
			index_writer.add_document(doc!(
				snippet_field => d.snippet.clone(),
				position_field => position as u64,
			))?;
		}
		index_writer.commit()?;
		Ok(Self { index, snippet_field, position_field, doc_count: docs.len() })
	}

	/// Raw BM25 score per document position; unmatched documents score 0.
	pub fn raw_scores(&self, query: &str) -> Result<Vec<f32>> {
		let mut scores = vec![0.0f32; self.doc_count];
		let terms = self.query_terms(query)?;
		if terms.is_empty() || self.doc_count == 0 { return Ok(scores); }

		let clauses: Vec<(Occur, Box<dyn Query>)> = terms
			.iter()
			.map(|t| {
				let term = Term::from_field_text(self.snippet_field, t);
				(Occur::Should, Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)) as Box<dyn Query>)
			})
			.collect();
		let query = BooleanQuery::new(clauses);

		let reader = self.index.reader()?;
		let searcher = reader.searcher();
		let top_docs = searcher.search(&query, &TopDocs::with_limit(self.doc_count))?;
		for (score, addr) in top_docs {
			let stored: TantivyDocument = searcher.doc(addr)?;
			let position = stored
				.get_first(self.position_field)
				.and_then(|v| v.as_u64())
				.ok_or_else(|| anyhow::anyhow!("indexed document without a position"))?;
			if let Some(slot) = scores.get_mut(position as usize) { *slot = score; }
		}
		Ok(scores)
	}

	/// Run the query through the same analyzer used at index time.
	fn query_terms(&self, query: &str) -> Result<Vec<String>> {
		let mut analyzer = self.index.tokenizer_for_field(self.snippet_field)?;
		let mut stream = analyzer.token_stream(query);
		let mut terms = Vec::new();
		while stream.advance() { terms.push(stream.token().text.clone()); }
		Ok(terms)
	}
}
