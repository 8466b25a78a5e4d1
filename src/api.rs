//! HTTP surface for the knowledge-base query service.
//!
//! The request handler itself operates on transport envelopes
//! ([`crate::handler::QueryEvent`]), which is what a function-hosting
//! platform delivers. This module bridges plain HTTP onto that contract for
//! local serving and tests: each inbound request on `/query` is wrapped into
//! an envelope using the nested v2 shape (the shape the HTTP-API transport
//! emits), handed to the handler, and the resulting envelope response is
//! converted back into an HTTP response.

use crate::handler::{self, HttpContext, QueryEvent, RequestContext};
use crate::knowledge::AnswerGenerator;
use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::Arc;

/// Build the HTTP router exposing the query endpoint.
pub fn create_router<G>(generator: Arc<G>) -> Router
where
    G: AnswerGenerator + 'static,
{
    Router::new()
        .route("/query", any(query_endpoint::<G>))
        .with_state(generator)
}

/// Wrap an HTTP request into a transport envelope and run the handler.
///
/// All methods are routed here so the handler's own method check produces the
/// contractual 400 for non-POST requests. Non-UTF-8 bodies are forwarded
/// base64-encoded with the envelope flag set, matching the binary-body
/// convention of the transport.
async fn query_endpoint<G>(
    axum::extract::State(generator): axum::extract::State<Arc<G>>,
    method: Method,
    body: Bytes,
) -> Response
where
    G: AnswerGenerator,
{
    let (body, is_base64_encoded) = match String::from_utf8(body.to_vec()) {
        Ok(text) => (text, false),
        Err(err) => (BASE64.encode(err.as_bytes()), true),
    };

    let event = QueryEvent {
        request_context: Some(RequestContext {
            http: Some(HttpContext {
                method: Some(method.to_string()),
            }),
            request_id: None,
        }),
        http_method: None,
        body: Some(body),
        is_base64_encoded,
    };

    let envelope = handler::handle_event(&event, generator.as_ref()).await;

    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = HeaderMap::new();
    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(*name), HeaderValue::try_from(*value))
        {
            headers.insert(name, value);
        }
    }

    (status, headers, envelope.body).into_response()
}
