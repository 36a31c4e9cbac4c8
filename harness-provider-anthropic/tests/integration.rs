//! HTTP-level integration tests against a mocked Anthropic endpoint.

use harness_provider_anthropic::Anthropic;
use harness_types::{CompletionRequest, Message, Provider, ProviderError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("what is 2+2?")],
        system: Some("be terse".into()),
        tools: vec![],
        max_tokens: Some(256),
        temperature: None,
    }
}

#[tokio::test]
async fn complete_returns_parsed_response_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "claude-sonnet-4-6",
            "content": [{"type": "text", "text": "4"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 20, "output_tokens": 3},
        })))
        .mount(&server)
        .await;

    let client = Anthropic::new("test-key").base_url(server.uri());
    let response = client.complete(sample_request()).await.unwrap();

    assert_eq!(response.text(), "4");
    assert_eq!(response.usage.input_tokens, 20);
}

#[tokio::test]
async fn complete_maps_401_to_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let client = Anthropic::new("bad-key").base_url(server.uri());
    let err = client.complete(sample_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthFailed(_)));
}

#[tokio::test]
async fn complete_maps_429_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = Anthropic::new("test-key").base_url(server.uri());
    let err = client.complete(sample_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn complete_surfaces_tool_use_stop_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "claude-sonnet-4-6",
            "content": [
                {"type": "text", "text": "running a check"},
                {"type": "tool_use", "id": "tu_1", "name": "bash", "input": {"command": "ls"}},
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 50, "output_tokens": 10},
        })))
        .mount(&server)
        .await;

    let client = Anthropic::new("test-key").base_url(server.uri());
    let response = client.complete(sample_request()).await.unwrap();

    assert_eq!(response.tool_uses().len(), 1);
    assert_eq!(response.tool_uses()[0].1, "bash");
}
