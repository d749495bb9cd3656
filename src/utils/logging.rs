//! Logging utilities
//!
//! Shared helpers that keep provider request logs short

use crate::models::inference::TextGenerationRequest;
use crate::models::openai::{ChatCompletionRequest, ChatMessage};

/// Set to true to include full prompts in debug logs
/// Default is false to reduce log verbosity
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars truncated)", head, total - max_chars)
    } else {
        s.to_string()
    }
}

fn filter_chat_message(msg: &ChatMessage) -> serde_json::Value {
    // System instructions are fixed, keep only a hint of them
    let max_len = if msg.role == "system" { 60 } else { 200 };
    serde_json::json!({
        "role": msg.role,
        "content": truncate_content(&msg.content, max_len),
    })
}

/// Create a filtered summary of a chat completion request for logging
pub fn chat_request_log_summary(request: &ChatCompletionRequest) -> serde_json::Value {
    if VERBOSE_REQUEST_LOGGING {
        serde_json::to_value(request).unwrap_or(serde_json::json!({"error": "serialize failed"}))
    } else {
        let messages: Vec<serde_json::Value> = request.messages.iter()
            .map(filter_chat_message)
            .collect();

        serde_json::json!({
            "model": request.model,
            "max_completion_tokens": request.max_completion_tokens,
            "messages": messages,
        })
    }
}

/// Create a filtered summary of a text-generation request for logging
pub fn text_generation_log_summary(request: &TextGenerationRequest) -> serde_json::Value {
    if VERBOSE_REQUEST_LOGGING {
        serde_json::to_value(request).unwrap_or(serde_json::json!({"error": "serialize failed"}))
    } else {
        serde_json::json!({
            "inputs": truncate_content(&request.inputs, 200),
            "max_new_tokens": request.parameters.max_new_tokens,
            "temperature": request.parameters.temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inference::TextGenerationParameters;

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("abcdefghij", 4), "abcd... (6 chars truncated)");
    }

    #[test]
    fn test_truncate_content_multibyte() {
        assert_eq!(truncate_content("ééééé", 2), "éé... (3 chars truncated)");
    }

    #[test]
    fn test_chat_summary_truncates_prompt() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage::user("x".repeat(500))],
            max_completion_tokens: Some(300),
            temperature: None,
        };

        let summary = chat_request_log_summary(&request);
        let content = summary["messages"][0]["content"].as_str().unwrap();
        assert!(content.ends_with("(300 chars truncated)"));
        assert_eq!(summary["max_completion_tokens"], 300);
    }

    #[test]
    fn test_text_generation_summary() {
        let request = TextGenerationRequest {
            inputs: "Soalan".to_string(),
            parameters: TextGenerationParameters {
                max_new_tokens: 400,
                temperature: 0.7,
                return_full_text: false,
            },
        };

        let summary = text_generation_log_summary(&request);
        assert_eq!(summary["inputs"], "Soalan");
        assert_eq!(summary["max_new_tokens"], 400);
    }
}
