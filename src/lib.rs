#![deny(missing_docs)]

//! Core library for the knowledge-base query service.

/// HTTP routing bridging requests onto the envelope handler.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Transport-envelope request handler.
pub mod handler;
/// Knowledge-base retrieval and answer generation client.
pub mod knowledge;
/// Structured logging and tracing setup.
pub mod logging;
/// Request and response schema validation.
pub mod schema;
