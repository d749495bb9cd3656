//! Configuration module unit tests

use qagen::config::Settings;
use std::collections::HashMap;

/// Key lookup backed by a fixed map
fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn full_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SERVER_HOST", "0.0.0.0"),
        ("SERVER_PORT", "9000"),
        ("OPENAI_API_KEY", "sk-test-key-12345678901234567890"),
        ("OPENAI_BASE_URL", "http://localhost:1234/v1"),
        ("OPENAI_MODEL", "gpt-4o-mini"),
        ("HF_API_KEY", "hf_test_token"),
        ("HF_INFERENCE_URL", "http://localhost:1235/models"),
        ("HF_MODEL", "mistralai/Mistral-7B-Instruct-v0.3"),
        ("MISTRAL_API_URL", "http://localhost:1236/models"),
        ("REQUEST_TIMEOUT", "15"),
        ("QUESTION_MAX_TOKENS", "256"),
        ("DEFAULT_QUESTIONS", "12"),
        ("MAX_UPLOAD_SIZE", "1048576"),
        ("SESSION_TTL", "900"),
        ("RUST_LOG", "debug"),
        ("LOG_FORMAT", "json"),
    ]
}

#[test]
fn test_settings_from_full_environment() {
    let settings = Settings::from_lookup(lookup(&full_env())).unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.openai.api_key.as_deref(), Some("sk-test-key-12345678901234567890"));
    assert_eq!(settings.openai.base_url, "http://localhost:1234/v1");
    assert_eq!(settings.openai.model, "gpt-4o-mini");
    assert_eq!(settings.inference.token.as_deref(), Some("hf_test_token"));
    assert_eq!(settings.inference.model, "mistralai/Mistral-7B-Instruct-v0.3");
    // Tertiary model follows HF_MODEL unless MISTRAL_MODEL is set
    assert_eq!(settings.inference.tertiary_model, "mistralai/Mistral-7B-Instruct-v0.3");
    assert_eq!(settings.inference.tertiary_base_url, "http://localhost:1236/models");
    assert_eq!(settings.request.timeout, 15);
    assert_eq!(settings.request.max_upload_size, 1048576);
    assert_eq!(settings.generation.question_max_tokens, 256);
    assert_eq!(settings.generation.default_questions, 12);
    assert_eq!(settings.session.ttl, 900);
    assert_eq!(settings.logging.format, "json");
    assert_eq!(settings.enabled_provider_count(), 3);
}

#[test]
fn test_default_upload_limit_and_question_count() {
    let settings = Settings::from_lookup(lookup(&[])).unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.request.max_upload_size, 20 * 1024 * 1024);
    assert_eq!(settings.request.timeout, 60);
    assert_eq!(settings.generation.default_questions, 30);
    assert!(settings.inference.tertiary_enabled);
    assert_eq!(settings.session.ttl, 3600);
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        ("SERVER_PORT", "not_a_number"),
        ("SERVER_PORT", "0"),
        ("OPENAI_BASE_URL", "api.openai.com"),
        ("MISTRAL_API_URL", "ftp://example.com"),
        ("REQUEST_TIMEOUT", "0"),
        ("DEFAULT_QUESTIONS", "0"),
        ("DEFAULT_QUESTIONS", "51"),
        ("MAX_UPLOAD_SIZE", "0"),
        ("SESSION_TTL", "0"),
        ("SESSION_TTL", "-5"),
        ("RUST_LOG", "verbose"),
        ("LOG_FORMAT", "xml"),
        ("TERTIARY_ENABLED", "maybe"),
        ("OPENAI_API_KEY", "sk test"),
    ];

    for (key, value) in cases {
        let result = Settings::from_lookup(lookup(&[(key, value)]));
        assert!(result.is_err(), "{}={} should be rejected", key, value);
    }
}

#[test]
fn test_credentials_are_trimmed() {
    let settings = Settings::from_lookup(lookup(&[("HF_API_KEY", "  hf_token \n")])).unwrap();
    assert_eq!(settings.inference.token.as_deref(), Some("hf_token"));
    assert_eq!(settings.enabled_provider_count(), 2);
}

#[test]
fn test_credentials_are_not_serialized() {
    let settings = Settings::from_lookup(lookup(&full_env())).unwrap();
    let json = serde_json::to_string(&settings).unwrap();

    assert!(!json.contains("sk-test-key"));
    assert!(!json.contains("hf_test_token"));
}
