//! Shared types used by the knowledge client.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned while producing an answer from the knowledge base.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Caller supplied an empty or whitespace-only query.
    #[error("Query must be a non-empty string")]
    InvalidInput,
    /// A required configuration value is unset or empty.
    #[error("{0} is not configured")]
    Config(&'static str),
    /// The retrieval or generation service reported an error.
    #[error("Failed to generate answer: {message}")]
    Upstream {
        /// Error code reported by the service, or `Unknown`.
        code: String,
        /// Human-readable message reported by the service.
        message: String,
    },
    /// HTTP layer failed before receiving a response.
    #[error("Error connecting to the knowledge service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The generation service responded in an unexpected shape or with an
    /// empty answer.
    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),
}

/// Response payload of the retrieval service.
#[derive(Debug, Deserialize)]
pub struct RetrieveResponse {
    /// Ranked context chunks, best match first.
    #[serde(default, rename = "retrievalResults")]
    pub retrieval_results: Vec<RetrievedChunk>,
}

/// One ranked result from the knowledge base. Only the nested text content is
/// interpreted; any other attributes the service attaches are ignored.
#[derive(Debug, Deserialize)]
pub struct RetrievedChunk {
    /// Content wrapper; may be absent in malformed results.
    #[serde(default)]
    pub content: Option<ChunkContent>,
}

/// Text payload nested inside a retrieval result.
#[derive(Debug, Deserialize)]
pub struct ChunkContent {
    /// Raw chunk text; may be absent or empty.
    #[serde(default)]
    pub text: Option<String>,
}

impl RetrievedChunk {
    /// Chunk text, if the nested field is present.
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(|content| content.text.as_deref())
    }
}

/// Response payload of the generation service.
#[derive(Debug, Deserialize)]
pub struct InvokeResponse {
    /// Model output wrapper.
    #[serde(default)]
    pub output: Option<ModelOutput>,
}

/// `output` object of a generation response.
#[derive(Debug, Deserialize)]
pub struct ModelOutput {
    /// Generated message.
    #[serde(default)]
    pub message: Option<ModelMessage>,
}

/// Generated message carrying a list of content segments.
#[derive(Debug, Deserialize)]
pub struct ModelMessage {
    /// Content segments; the first text segment carries the answer.
    #[serde(default)]
    pub content: Vec<ContentSegment>,
}

/// One segment of generated message content.
#[derive(Debug, Deserialize)]
pub struct ContentSegment {
    /// Text carried by this segment, if any.
    #[serde(default)]
    pub text: Option<String>,
}
