//! Transport-envelope request handler for the query endpoint.
//!
//! The handler consumes one HTTP-API-shaped event (method, optional base64
//! flag, body string, nested request context) and produces a transport
//! response with a status code, fixed CORS headers, and a JSON body string.
//! Every failure is converted into a structured response; no path panics or
//! propagates past this boundary.

use crate::knowledge::{AnswerGenerator, GenerateError};
use crate::schema::{QueryRequest, QueryResponse};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Inbound transport event.
///
/// Two envelope shapes are tolerated: HTTP-API v2 payloads carry the method
/// under `requestContext.http.method`, while the older REST/v1 payloads carry
/// a flat `httpMethod`. [`QueryEvent::method`] resolves the union explicitly.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryEvent {
    /// Nested request context (v2 payload shape).
    pub request_context: Option<RequestContext>,
    /// Flat method field (v1 payload shape).
    pub http_method: Option<String>,
    /// Raw request body, possibly base64-encoded.
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    pub is_base64_encoded: bool,
}

/// Nested request context of a v2 envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    /// HTTP sub-object carrying the method.
    pub http: Option<HttpContext>,
    /// Transport-assigned request identifier, used for log correlation.
    pub request_id: Option<String>,
}

/// `http` sub-object of a v2 request context.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HttpContext {
    /// HTTP method of the inbound request.
    pub method: Option<String>,
}

impl QueryEvent {
    /// Resolve the HTTP method across both envelope shapes, uppercased.
    /// Prefers the nested v2 field; falls back to the flat v1 field.
    pub fn method(&self) -> String {
        self.request_context
            .as_ref()
            .and_then(|context| context.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .filter(|method| !method.is_empty())
            .or(self.http_method.as_deref())
            .unwrap_or_default()
            .to_uppercase()
    }

    fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|context| context.request_id.as_deref())
    }
}

/// Outbound transport response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Fixed CORS-enabling header set, identical on every path.
    pub headers: BTreeMap<&'static str, &'static str>,
    /// Serialized JSON body.
    pub body: String,
}

impl GatewayResponse {
    fn new(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            headers: response_headers(),
            body: body.to_string(),
        }
    }
}

fn response_headers() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ])
}

fn internal_error() -> GatewayResponse {
    GatewayResponse::new(
        500,
        json!({
            "error": "Internal server error",
            "message": "An unexpected error occurred while processing your request"
        }),
    )
}

/// Process one query event: validate, generate an answer, and map the outcome
/// to a transport response. Terminal at the first failing step; no retries.
pub async fn handle_event<G>(event: &QueryEvent, generator: &G) -> GatewayResponse
where
    G: AnswerGenerator + ?Sized,
{
    let method = event.method();
    if method != "POST" {
        tracing::warn!(method = %method, "Invalid HTTP method");
        return GatewayResponse::new(
            400,
            json!({ "error": format!("Method not allowed. Expected POST, got {method}") }),
        );
    }

    let body_str = event.body.clone().unwrap_or_default();
    let body_str = if event.is_base64_encoded {
        let decoded = BASE64
            .decode(&body_str)
            .map_err(|err| err.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|err| err.to_string()));
        match decoded {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "Failed to decode base64 request body");
                return internal_error();
            }
        }
    } else {
        body_str
    };

    if body_str.is_empty() {
        tracing::warn!("Empty request body");
        return GatewayResponse::new(
            400,
            json!({ "error": "Request body is required and must contain a 'query' field" }),
        );
    }

    let body_json: Value = match serde_json::from_str(&body_str) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "Invalid JSON in request body");
            return GatewayResponse::new(
                400,
                json!({ "error": format!("Invalid JSON format: {err}") }),
            );
        }
    };

    let request = match QueryRequest::from_value(&body_json) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(details = ?err.details(), "Request validation failed");
            return GatewayResponse::new(
                400,
                json!({ "error": "Invalid request format", "details": err.details() }),
            );
        }
    };

    tracing::info!(
        request_id = event.request_id().unwrap_or("-"),
        query = %request.query.chars().take(100).collect::<String>(),
        "Processing query"
    );

    match generator.generate_answer(&request.query).await {
        Ok(answer) => {
            tracing::info!("Successfully generated answer");
            match serde_json::to_string(&QueryResponse::new(answer)) {
                Ok(body) => GatewayResponse {
                    status_code: 200,
                    headers: response_headers(),
                    body,
                },
                Err(err) => {
                    tracing::error!(error = %err, "Failed to serialize response body");
                    internal_error()
                }
            }
        }
        Err(err @ GenerateError::InvalidInput) => {
            tracing::warn!(error = %err, "Rejected blank query");
            GatewayResponse::new(
                400,
                json!({ "error": "Invalid request format", "details": [err.to_string()] }),
            )
        }
        Err(err @ GenerateError::Config(_)) => {
            tracing::error!(error = %err, "Configuration error");
            GatewayResponse::new(
                500,
                json!({ "error": "Configuration error", "message": err.to_string() }),
            )
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to generate answer");
            GatewayResponse::new(
                500,
                json!({
                    "error": "Failed to generate answer from knowledge base",
                    "message": err.to_string()
                }),
            )
        }
    }
}
