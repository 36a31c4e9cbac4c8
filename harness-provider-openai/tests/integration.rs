//! HTTP-level integration tests against a mocked OpenAI-compatible endpoint.

use harness_provider_openai::OpenAiCompat;
use harness_types::{CompletionRequest, Message, Provider, ProviderError, ToolDefinition};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::user("list the files here")],
        system: Some("be terse".into()),
        tools: vec![ToolDefinition {
            name: "bash".into(),
            description: "run a command".into(),
            input_schema: json!({"type": "object"}),
        }],
        max_tokens: Some(512),
        temperature: None,
    }
}

#[tokio::test]
async fn complete_returns_parsed_response_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen3-32b",
            "choices": [{
                "finish_reason": "stop",
                "message": {"content": "there are 3 files"},
            }],
            "usage": {"prompt_tokens": 30, "completion_tokens": 6},
        })))
        .mount(&server)
        .await;

    let client = OpenAiCompat::new("qwen3-32b").base_url(server.uri() + "/v1");
    let response = client.complete(sample_request()).await.unwrap();

    assert_eq!(response.text(), "there are 3 files");
    assert_eq!(response.usage.input_tokens, 30);
}

#[tokio::test]
async fn complete_maps_native_tool_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen3-32b",
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "bash", "arguments": "{\"command\": \"ls\"}"},
                    }],
                },
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 8},
        })))
        .mount(&server)
        .await;

    let client = OpenAiCompat::new("qwen3-32b").base_url(server.uri() + "/v1");
    let response = client.complete(sample_request()).await.unwrap();

    assert_eq!(response.tool_uses().len(), 1);
    assert_eq!(response.tool_uses()[0].1, "bash");
}

#[tokio::test]
async fn complete_maps_401_to_auth_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = OpenAiCompat::new("qwen3-32b").base_url(server.uri() + "/v1");
    let err = client.complete(sample_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthFailed(_)));
}
