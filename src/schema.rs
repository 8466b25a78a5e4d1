//! Request and response shapes for the query endpoint.
//!
//! Inbound bodies are untrusted, so [`QueryRequest`] is built from a parsed
//! [`serde_json::Value`] with explicit field checks that enumerate every
//! failing field's message, rather than a bare serde derive whose first error
//! aborts deserialization.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Validation failure for an inbound request body.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// One or more fields failed shape or required-field checks.
    #[error("Invalid request format: {}", details.join("; "))]
    Validation {
        /// Per-field error messages, one entry per failing check.
        details: Vec<String>,
    },
}

impl SchemaError {
    /// Per-field messages carried by this validation failure.
    pub fn details(&self) -> &[String] {
        match self {
            Self::Validation { details } => details,
        }
    }
}

/// Validated query request: a single non-empty `query` string.
///
/// Minimum length 1 with no trimming; whitespace-only queries pass the schema
/// and are rejected separately by the generation client.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// User's question or query string.
    pub query: String,
}

impl QueryRequest {
    /// Validate a parsed JSON body, collecting every field-level failure.
    pub fn from_value(body: &Value) -> Result<Self, SchemaError> {
        let mut details = Vec::new();

        let query = match body.get("query") {
            None => {
                details.push("query: field is required".to_string());
                None
            }
            Some(Value::String(text)) => {
                if text.is_empty() {
                    details.push("query: must not be empty".to_string());
                    None
                } else {
                    Some(text.clone())
                }
            }
            Some(_) => {
                details.push("query: must be a string".to_string());
                None
            }
        };

        match query {
            Some(query) if details.is_empty() => Ok(Self { query }),
            _ => Err(SchemaError::Validation { details }),
        }
    }
}

/// Outbound answer payload, serialized as `{"answer": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Generated answer from the knowledge base.
    pub answer: String,
}

impl QueryResponse {
    /// Wrap a generated answer for serialization.
    pub fn new(answer: String) -> Self {
        Self { answer }
    }
}
