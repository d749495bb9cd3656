//! Fallback gateway tests against mocked provider endpoints

use httpmock::prelude::*;
use qagen::config::settings::OpenAIConfig;
use qagen::models::ProviderId;
use qagen::providers::inference::InferenceProvider;
use qagen::providers::openai::OpenAIProvider;
use qagen::providers::{GenerationRequest, Provider};
use qagen::services::{Gateway, GenerationOutcome};
use qagen::AppError;
use serde_json::json;
use std::sync::Arc;

const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

fn openai_provider(server: &MockServer) -> OpenAIProvider {
    let config = OpenAIConfig {
        api_key: None,
        base_url: server.url("/v1"),
        model: "gpt-3.5-turbo".to_string(),
    };
    OpenAIProvider::new(&config, "sk-test", 5).unwrap()
}

fn inference_provider(server: &MockServer, id: ProviderId) -> InferenceProvider {
    InferenceProvider::new(id, &server.url("/models"), MODEL, "hf_test", 5).unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest::new("Apakah Rukun Islam?", 300)
}

#[tokio::test]
async fn test_openai_provider_success() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-test")
            .json_body_partial(r#"{"model": "gpt-3.5-turbo", "max_completion_tokens": 300}"#);
        then.status(200).json_body(json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Rukun Islam ada lima."},
                "finish_reason": "stop"
            }]
        }));
    }).await;

    let text = openai_provider(&server).generate(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(text, "Rukun Islam ada lima.");
}

#[tokio::test]
async fn test_openai_error_body_is_reported() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429).json_body(json!({
            "error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}
        }));
    }).await;

    let error = openai_provider(&server).generate(&request()).await.unwrap_err();

    match error {
        AppError::ProviderCallFailed { provider, message } => {
            assert_eq!(provider, "OpenAI");
            assert!(message.contains("429"));
            assert!(message.contains("exceeded your current quota"));
        }
        other => panic!("Expected provider failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inference_provider_accepts_list_and_object() {
    let server = MockServer::start_async().await;
    let path = format!("/models/{}", MODEL);
    server.mock_async(|when, then| {
        when.method(POST)
            .path(path.as_str())
            .header("authorization", "Bearer hf_test")
            .json_body_partial(r#"{"parameters": {"max_new_tokens": 300, "temperature": 0.7, "return_full_text": false}}"#);
        then.status(200).json_body(json!([{"generated_text": "Syahadah, solat, zakat, puasa dan haji."}]));
    }).await;

    let provider = inference_provider(&server, ProviderId::HuggingFace);
    let text = provider.generate(&request()).await.unwrap();
    assert_eq!(text, "Syahadah, solat, zakat, puasa dan haji.");

    let object_server = MockServer::start_async().await;
    object_server.mock_async(|when, then| {
        when.method(POST).path(path.as_str());
        then.status(200).json_body(json!({"generated_text": "Lima perkara."}));
    }).await;

    let provider = inference_provider(&object_server, ProviderId::MistralApi);
    assert_eq!(provider.generate(&request()).await.unwrap(), "Lima perkara.");
}

#[tokio::test]
async fn test_tertiary_provider_sends_fixed_temperature() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .json_body_partial(r#"{"parameters": {"temperature": 0.7, "max_new_tokens": 700}}"#);
        then.status(200).json_body(json!([{"generated_text": "ok"}]));
    }).await;

    let provider = inference_provider(&server, ProviderId::MistralApi);
    let text = provider
        .generate(&GenerationRequest::new("Terangkan zakat harta.", 700))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_inference_loading_error_is_failure() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST);
        then.status(503).json_body(json!({"error": "Model is currently loading", "estimated_time": 20.0}));
    }).await;

    let error = inference_provider(&server, ProviderId::HuggingFace)
        .generate(&request())
        .await
        .unwrap_err();

    assert!(error.to_string().contains("Model is currently loading"));
}

#[tokio::test]
async fn test_primary_failure_falls_back_to_secondary() {
    let primary = MockServer::start_async().await;
    let secondary = MockServer::start_async().await;
    let tertiary = MockServer::start_async().await;

    let primary_mock = primary.mock_async(|when, then| {
        when.method(POST);
        then.status(500).body("internal error");
    }).await;
    let secondary_mock = secondary.mock_async(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([{"generated_text": "  Jawapan daripada HuggingFace.  "}]));
    }).await;
    let tertiary_mock = tertiary.mock_async(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([{"generated_text": "tidak sepatutnya dipanggil"}]));
    }).await;

    let gateway = Gateway::new(vec![
        Arc::new(openai_provider(&primary)),
        Arc::new(inference_provider(&secondary, ProviderId::HuggingFace)),
        Arc::new(inference_provider(&tertiary, ProviderId::MistralApi)),
    ]);

    let outcome = gateway.complete(&request()).await;

    assert_eq!(outcome, GenerationOutcome::Generated {
        text: "Jawapan daripada HuggingFace.".to_string(),
        provider: ProviderId::HuggingFace,
    });
    primary_mock.assert_hits_async(1).await;
    secondary_mock.assert_hits_async(1).await;
    tertiary_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_empty_completion_falls_through_to_tertiary() {
    let secondary = MockServer::start_async().await;
    let tertiary = MockServer::start_async().await;

    secondary.mock_async(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([{"generated_text": "   "}]));
    }).await;
    tertiary.mock_async(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!([{"generated_text": "Jawapan terakhir."}]));
    }).await;

    let gateway = Gateway::new(vec![
        Arc::new(inference_provider(&secondary, ProviderId::HuggingFace)),
        Arc::new(inference_provider(&tertiary, ProviderId::MistralApi)),
    ]);

    let outcome = gateway.complete(&request()).await;
    assert_eq!(outcome.provider(), Some(ProviderId::MistralApi));
    assert_eq!(outcome.text(), Some("Jawapan terakhir."));
}

#[tokio::test]
async fn test_all_providers_failing_is_exhausted() {
    let primary = MockServer::start_async().await;
    let secondary = MockServer::start_async().await;

    primary.mock_async(|when, then| {
        when.method(POST);
        then.status(401).json_body(json!({"error": {"message": "Invalid API key"}}));
    }).await;
    secondary.mock_async(|when, then| {
        when.method(POST);
        then.status(500).json_body(json!({"error": "Internal error"}));
    }).await;

    let gateway = Gateway::new(vec![
        Arc::new(openai_provider(&primary)),
        Arc::new(inference_provider(&secondary, ProviderId::HuggingFace)),
    ]);

    match gateway.complete(&request()).await {
        GenerationOutcome::Exhausted { failures } => {
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].provider, ProviderId::OpenAI);
            assert_eq!(failures[1].provider, ProviderId::HuggingFace);
            assert!(failures[0].message.contains("Invalid API key"));
        }
        other => panic!("Expected exhausted outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_a_failure() {
    // Nothing listens on port 9 of localhost
    let provider = InferenceProvider::new(ProviderId::HuggingFace, "http://127.0.0.1:9/models", MODEL, "hf", 2).unwrap();
    let gateway = Gateway::new(vec![Arc::new(provider)]);

    assert!(gateway.complete(&request()).await.is_exhausted());
}
