//! querylab-llm
//!
//! Blocking LLM providers behind one trait and what is built on them: the
//! fixed-order registry with its health check, the relevance judge, the
//! strategy explainer and the job-post assistant.

pub mod error;
pub mod explain;
pub mod judge;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod role;

pub use error::LlmError;
pub use explain::Explainer;
pub use judge::LlmJudge;
pub use provider::{complete_first, Completion, CompletionOptions, LlmProvider};
pub use registry::{HealthReport, HealthStatus, ProviderRegistry};
pub use role::{RoleAssistant, RoleSummary};
