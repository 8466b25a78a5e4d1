//! HTTP client wrapper for the retrieval and generation services.

use crate::config::Config;
use crate::knowledge::{
    prompt::{NO_CONTEXT_FALLBACK, build_prompt, join_context},
    types::{GenerateError, InvokeResponse, RetrieveResponse, RetrievedChunk},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Number of ranked chunks requested per retrieval; bounds prompt size.
const MAX_RESULTS: usize = 5;
/// Generation output cap in tokens.
const MAX_TOKENS: u32 = 1024;
/// Sampling temperature for generation.
const TEMPERATURE: f64 = 0.7;

/// Interface for producing a grounded answer to a query.
///
/// The HTTP surface depends on this trait rather than on the concrete client
/// so tests can substitute a stub without touching process state.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Retrieve context for `query` from the knowledge base and generate an
    /// answer with the foundation model.
    async fn generate_answer(&self, query: &str) -> Result<String, GenerateError>;
}

/// Lightweight HTTP client for knowledge-base retrieval and model invocation.
///
/// Constructed once at startup and shared across requests; the underlying
/// `reqwest::Client` pools connections internally.
pub struct KnowledgeClient {
    pub(crate) client: Client,
    pub(crate) retrieval_url: String,
    pub(crate) generation_url: String,
    pub(crate) knowledge_base_id: String,
    pub(crate) model_id: String,
}

impl KnowledgeClient {
    /// Construct a new client from resolved configuration.
    pub fn new(config: &Config) -> Result<Self, GenerateError> {
        let client = Client::builder().user_agent("kb-query/0.1").build()?;
        tracing::debug!(
            retrieval_url = %config.retrieval_url,
            generation_url = %config.generation_url,
            "Initialized knowledge client"
        );

        Ok(Self {
            client,
            retrieval_url: trim_base_url(&config.retrieval_url),
            generation_url: trim_base_url(&config.generation_url),
            knowledge_base_id: config.knowledge_base_id.clone(),
            model_id: config.model_id.clone(),
        })
    }

    /// Fetch the top ranked context chunks for a query.
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>, GenerateError> {
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.retrieval_url, self.knowledge_base_id
        );
        let body = json!({
            "retrievalQuery": { "text": query },
            "retrievalConfiguration": {
                "vectorSearchConfiguration": { "numberOfResults": MAX_RESULTS }
            }
        });

        let response = self.client.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            let error = decode_upstream_error(response).await;
            tracing::error!(error = %error, "Error retrieving from knowledge base");
            return Err(error);
        }

        let payload: RetrieveResponse = response.json().await?;
        let results = payload.retrieval_results;
        tracing::info!(results = results.len(), "Retrieved results from knowledge base");
        if results.is_empty() {
            tracing::warn!("Retrieval returned empty results list");
        }
        Ok(results)
    }

    /// Invoke the foundation model with an assembled prompt and extract the
    /// answer text.
    async fn invoke_model(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/model/{}/invoke", self.generation_url, self.model_id);
        let body = json!({
            "messages": [
                { "role": "user", "content": [ { "text": prompt } ] }
            ],
            "inferenceConfig": {
                "maxTokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }
        });

        tracing::info!(model = %self.model_id, "Invoking foundation model");
        let response = self.client.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            let error = decode_upstream_error(response).await;
            tracing::error!(error = %error, "Error invoking foundation model");
            return Err(error);
        }

        let raw = response.text().await?;
        let payload: InvokeResponse = serde_json::from_str(&raw)
            .map_err(|err| GenerateError::ResponseFormat(err.to_string()))?;

        let answer = payload
            .output
            .and_then(|output| output.message)
            .and_then(|message| message.content.into_iter().next())
            .and_then(|segment| segment.text)
            .ok_or_else(|| {
                GenerateError::ResponseFormat(
                    "could not extract answer from foundation model response".to_string(),
                )
            })?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(GenerateError::ResponseFormat(
                "empty answer received from foundation model".to_string(),
            ));
        }
        Ok(answer.to_string())
    }
}

#[async_trait]
impl AnswerGenerator for KnowledgeClient {
    async fn generate_answer(&self, query: &str) -> Result<String, GenerateError> {
        if query.trim().is_empty() {
            return Err(GenerateError::InvalidInput);
        }
        // Both identifiers are checked before any network call; a missing
        // model id must not cost a wasted retrieval round-trip.
        if self.knowledge_base_id.trim().is_empty() {
            return Err(GenerateError::Config("KNOWLEDGE_BASE_ID"));
        }
        if self.model_id.trim().is_empty() {
            return Err(GenerateError::Config("MODEL_ID"));
        }

        tracing::info!(query = %truncate_for_log(query, 50), "Retrieving context for query");
        let chunks = self.retrieve(query).await?;

        let Some(context) = join_context(&chunks) else {
            tracing::warn!(
                results = chunks.len(),
                "No valid context retrieved; returning fallback answer"
            );
            return Ok(NO_CONTEXT_FALLBACK.to_string());
        };

        self.invoke_model(&build_prompt(&context, query)).await
    }
}

/// Decode a non-success service response into an upstream error, pulling the
/// error code from the `x-amzn-ErrorType` header or a `__type` body field and
/// the message from the JSON body, falling back to the raw body text.
async fn decode_upstream_error(response: reqwest::Response) -> GenerateError {
    let header_code = response
        .headers()
        .get("x-amzn-ErrorType")
        .and_then(|value| value.to_str().ok())
        // The header value may carry a URI-qualified type; keep the leaf.
        .map(|value| value.split(':').next().unwrap_or(value).to_string());

    let body = response.text().await.unwrap_or_default();
    let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();

    let code = header_code
        .or_else(|| {
            parsed
                .as_ref()
                .and_then(|value| value.get("__type"))
                .and_then(|value| value.as_str())
                .map(|value| value.rsplit('#').next().unwrap_or(value).to_string())
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let message = parsed
        .as_ref()
        .and_then(|value| value.get("message").or_else(|| value.get("Message")))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or(body);

    GenerateError::Upstream { code, message }
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
