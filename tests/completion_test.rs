//! Integration tests for the completion providers
//!
//! Both providers run against a mock server: successful completions carry
//! usage, body-level error payloads and non-success statuses surface as
//! errors, and each provider sends its own request shape.

use topika::config::{OpenAiConfig, RelayConfig};
use topika::providers::{ChatMessage, CompletionProvider, OpenAiProvider, RelayProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn success_body() -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": "Here is an answer."}}],
        "usage": {"prompt_tokens": 42, "completion_tokens": 7}
    })
}

fn openai_provider(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new(OpenAiConfig {
        api_base: server.uri(),
        model: "gpt-4o-mini".to_string(),
    })
    .unwrap()
}

fn relay_provider(server: &MockServer) -> RelayProvider {
    RelayProvider::new(RelayConfig {
        base_url: server.uri(),
    })
    .unwrap()
}

#[tokio::test]
async fn openai_completion_success_with_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "max_tokens": 1000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = openai_provider(&server);
    let messages = vec![
        ChatMessage::system("context block"),
        ChatMessage::user("What about meetings?"),
    ];
    let completion = provider.complete("sk-test", &messages).await.unwrap();

    assert_eq!(completion.content, "Here is an answer.");
    let usage = completion.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 42);
    assert_eq!(usage.completion_tokens, 7);
}

#[tokio::test]
async fn openai_sends_full_message_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system", "content": "context block"},
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "reply"},
                {"role": "user", "content": "second"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = openai_provider(&server);
    let messages = vec![
        ChatMessage::system("context block"),
        ChatMessage::user("first"),
        ChatMessage::assistant("reply"),
        ChatMessage::user("second"),
    ];
    provider.complete("sk-test", &messages).await.unwrap();
}

#[tokio::test]
async fn openai_error_payload_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let provider = openai_provider(&server);
    let result = provider
        .complete("sk-bad", &[ChatMessage::user("hi")])
        .await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Incorrect API key provided"));
}

#[tokio::test]
async fn openai_non_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = openai_provider(&server);
    let result = provider.complete("sk-test", &[ChatMessage::user("hi")]).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("429"));
}

#[tokio::test]
async fn openai_missing_choices_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = openai_provider(&server);
    assert!(provider
        .complete("sk-test", &[ChatMessage::user("hi")])
        .await
        .is_err());
}

#[tokio::test]
async fn relay_sends_latest_user_message_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "message": "second question",
            "api_key": "sk-test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = relay_provider(&server);
    let messages = vec![
        ChatMessage::system("ignored by the relay"),
        ChatMessage::user("first question"),
        ChatMessage::assistant("first answer"),
        ChatMessage::user("second question"),
    ];
    let completion = provider.complete("sk-test", &messages).await.unwrap();
    assert_eq!(completion.content, "Here is an answer.");
}

#[tokio::test]
async fn relay_error_payload_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Missing message or API key"
        })))
        .mount(&server)
        .await;

    let provider = relay_provider(&server);
    let result = provider.complete("sk-test", &[ChatMessage::user("hi")]).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Missing message or API key"));
}

#[tokio::test]
async fn relay_non_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let provider = relay_provider(&server);
    assert!(provider
        .complete("sk-test", &[ChatMessage::user("hi")])
        .await
        .is_err());
}
