//! End-to-end tests: transport envelope through the handler and the real
//! knowledge client, with the retrieval and generation services mocked.

use httpmock::{Method::POST, MockServer};
use kb_query::config::Config;
use kb_query::handler::{self, QueryEvent};
use kb_query::knowledge::{KnowledgeClient, NO_CONTEXT_FALLBACK};
use serde_json::{Value, json};

fn test_config(base_url: &str) -> Config {
    Config {
        retrieval_url: base_url.to_string(),
        generation_url: base_url.to_string(),
        knowledge_base_id: "kb-e2e".to_string(),
        model_id: "answer-model".to_string(),
        server_port: None,
    }
}

fn post_event(body: Value) -> QueryEvent {
    serde_json::from_value(json!({
        "requestContext": {
            "http": { "method": "POST" },
            "requestId": "e2e-request"
        },
        "body": body.to_string(),
        "isBase64Encoded": false
    }))
    .expect("event deserializes")
}

fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("response body is JSON")
}

#[tokio::test]
async fn query_is_answered_from_retrieved_context() {
    let server = MockServer::start_async().await;

    let retrieve_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/knowledgebases/kb-e2e/retrieve");
            then.status(200).json_body(json!({
                "retrievalResults": [
                    { "content": { "text": "Serverless platforms bill per request." } }
                ]
            }));
        })
        .await;
    let invoke_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/model/answer-model/invoke");
            then.status(200).json_body(json!({
                "output": { "message": { "content": [ { "text": "Test answer" } ] } }
            }));
        })
        .await;

    let client = KnowledgeClient::new(&test_config(&server.base_url())).expect("client");
    let event = post_event(json!({
        "query": "What are the key principles of serverless architecture?"
    }));

    let response = handler::handle_event(&event, &client).await;

    retrieve_mock.assert_async().await;
    invoke_mock.assert_async().await;
    assert_eq!(response.status_code, 200);
    assert_eq!(body_json(&response.body), json!({ "answer": "Test answer" }));
    assert_eq!(response.headers["Content-Type"], "application/json");
}

#[tokio::test]
async fn empty_knowledge_base_yields_fallback_answer() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/knowledgebases/kb-e2e/retrieve");
            then.status(200).json_body(json!({ "retrievalResults": [] }));
        })
        .await;
    let invoke_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/model/answer-model/invoke");
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = KnowledgeClient::new(&test_config(&server.base_url())).expect("client");
    let response = handler::handle_event(&post_event(json!({ "query": "anything" })), &client).await;

    invoke_mock.assert_hits_async(0).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(
        body_json(&response.body),
        json!({ "answer": NO_CONTEXT_FALLBACK })
    );
}

#[tokio::test]
async fn upstream_failure_surfaces_as_structured_500() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/knowledgebases/kb-e2e/retrieve");
            then.status(400)
                .header("x-amzn-ErrorType", "ValidationException")
                .json_body(json!({ "message": "Knowledge base kb-e2e not found" }));
        })
        .await;

    let client = KnowledgeClient::new(&test_config(&server.base_url())).expect("client");
    let response = handler::handle_event(&post_event(json!({ "query": "x" })), &client).await;

    assert_eq!(response.status_code, 500);
    let body = body_json(&response.body);
    assert_eq!(body["error"], "Failed to generate answer from knowledge base");
    assert_eq!(
        body["message"],
        "Failed to generate answer: Knowledge base kb-e2e not found"
    );
}

#[tokio::test]
async fn missing_model_configuration_surfaces_as_configuration_error() {
    let server = MockServer::start_async().await;
    let catch_all = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let mut config = test_config(&server.base_url());
    config.model_id = String::new();
    let client = KnowledgeClient::new(&config).expect("client");

    let response = handler::handle_event(&post_event(json!({ "query": "x" })), &client).await;

    catch_all.assert_hits_async(0).await;
    assert_eq!(response.status_code, 500);
    let body = body_json(&response.body);
    assert_eq!(body["error"], "Configuration error");
    assert_eq!(body["message"], "MODEL_ID is not configured");
}

#[tokio::test]
async fn unreachable_services_surface_as_structured_500() {
    // Point the client at a port nothing listens on; the connection error is
    // recovered into a structured response rather than propagating.
    let config = test_config("http://127.0.0.1:1");
    let client = KnowledgeClient::new(&config).expect("client");

    let response = handler::handle_event(&post_event(json!({ "query": "x" })), &client).await;

    assert_eq!(response.status_code, 500);
    let body = body_json(&response.body);
    assert_eq!(body["error"], "Failed to generate answer from knowledge base");
    assert!(body.get("message").is_some());
}
