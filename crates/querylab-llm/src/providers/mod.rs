//! HTTP providers: OpenAI, Cohere, Groq and Gemini.

mod http;

pub mod cohere;
pub mod gemini;
pub mod groq;
pub mod openai;

pub use cohere::CohereProvider;
pub use gemini::GeminiProvider;
pub use groq::groq;
pub use openai::OpenAiProvider;
