//! Knowledge-base retrieval and grounded answer generation.

pub mod client;
pub mod prompt;
pub mod types;

pub use client::{AnswerGenerator, KnowledgeClient};
pub use prompt::NO_CONTEXT_FALLBACK;
pub use types::{GenerateError, RetrievedChunk};
