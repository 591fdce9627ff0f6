//! Integration tests for the Messages API client against a mock server.

mod common;

use commitscribe::llm::anthropic::API_VERSION;
use commitscribe::{AnthropicClient, CompletionClient, CompletionRequest, GenerationError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{error_reply, messages_reply};

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        api_key: "sk-test".to_string(),
        model: "claude-test".to_string(),
        prompt: prompt.to_string(),
        max_tokens: 100,
    }
}

#[tokio::test]
async fn test_complete_sends_messages_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", API_VERSION))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "max_tokens": 100,
            "messages": [{"role": "user", "content": "the prompt"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_reply("feat: add line")))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri()).unwrap();
    let text = client.complete(&request("the prompt")).await.unwrap();

    assert_eq!(text, "feat: add line");
}

#[tokio::test]
async fn test_complete_returns_text_untrimmed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(messages_reply(" feat: add line\n\n")),
        )
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri()).unwrap();
    let text = client.complete(&request("p")).await.unwrap();

    // Trimming is the generator's job.
    assert_eq!(text, " feat: add line\n\n");
}

#[tokio::test]
async fn test_authentication_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(error_reply("authentication_error", "invalid x-api-key")),
        )
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri()).unwrap();
    let result = client.complete(&request("p")).await;

    match result {
        Err(GenerationError::Api {
            status,
            kind,
            message,
        }) => {
            assert_eq!(status, 401);
            assert_eq!(kind.as_deref(), Some("authentication_error"));
            assert_eq!(message, "invalid x-api-key");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(error_reply("rate_limit_error", "slow down")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri()).unwrap();
    let result = client.complete(&request("p")).await;

    assert!(matches!(
        result,
        Err(GenerationError::Api { status: 429, .. })
    ));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(server.uri()).unwrap();
    let result = client.complete(&request("p")).await;

    assert!(matches!(result, Err(GenerationError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1.
    let client = AnthropicClient::new("http://127.0.0.1:1").unwrap();
    let result = client.complete(&request("p")).await;

    assert!(matches!(result, Err(GenerationError::Transport(_))));
}
