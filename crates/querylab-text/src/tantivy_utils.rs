use std::str::CharIndices;

use tantivy::schema::{Schema, TextFieldIndexing, TextOptions, IndexRecordOption, STORED};
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, Token, TokenStream, Tokenizer};
use tantivy::Index;

pub const SNIPPET_FIELD: &str = "snippet";
pub const POSITION_FIELD: &str = "position";
pub const TOKENIZER_NAME: &str = "lowercase_whitespace";

/// One indexed text field for the snippet plus the stored collection position.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER_NAME).set_index_option(IndexRecordOption::WithFreqs);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _snippet_field = schema_builder.add_text_field(SNIPPET_FIELD, text_options);
	let _position_field = schema_builder.add_u64_field(POSITION_FIELD, STORED);
	schema_builder.build()
}

/// Lowercase + Unicode whitespace split, matching `querylab_core::tokenize::tokenize`.
pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(TOKENIZER_NAME, analyzer());
}

pub fn analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(UnicodeWhitespaceTokenizer::default())
		.filter(LowerCaser)
		.build()
}

/// Splits on every `char::is_whitespace` character, not only ASCII
/// whitespace like tantivy's `WhitespaceTokenizer`.
#[derive(Clone, Default)]
pub struct UnicodeWhitespaceTokenizer {
	token: Token,
}

pub struct UnicodeWhitespaceTokenStream<'a> {
	text: &'a str,
	chars: CharIndices<'a>,
	token: &'a mut Token,
}

impl Tokenizer for UnicodeWhitespaceTokenizer {
	type TokenStream<'a> = UnicodeWhitespaceTokenStream<'a>;

	fn token_stream<'a>(&'a mut self, text: &'a str) -> UnicodeWhitespaceTokenStream<'a> {
		self.token.reset();
		UnicodeWhitespaceTokenStream { text, chars: text.char_indices(), token: &mut self.token }
	}
}

impl UnicodeWhitespaceTokenStream<'_> {
	fn token_end(&mut self) -> usize {
		(&mut self.chars)
			.find(|(_, c)| c.is_whitespace())
			.map(|(offset, _)| offset)
			.unwrap_or(self.text.len())
	}
}

impl TokenStream for UnicodeWhitespaceTokenStream<'_> {
	fn advance(&mut self) -> bool {
		self.token.text.clear();
		self.token.position = self.token.position.wrapping_add(1);
		while let Some((offset_from, c)) = self.chars.next() {
			if !c.is_whitespace() {
				let offset_to = self.token_end();
				self.token.offset_from = offset_from;
				self.token.offset_to = offset_to;
				self.token.text.push_str(&self.text[offset_from..offset_to]);
				return true;
			}
		}
		false
	}

	fn token(&self) -> &Token { self.token }

	fn token_mut(&mut self) -> &mut Token { self.token }
}
