//! Model invocation: build the completion request and send it.
//!
//! The network sits behind [`ChatBackend`], so the invocation policy here
//! can be exercised against a scripted backend. All prompt wording lives in
//! [`crate::prompts`].
//!
//! ## Fallback
//!
//! A schema-constrained request may be refused by deployments that do not
//! implement `json_schema` even when the version string claims support. When
//! that exact failure happens the request is re-sent once, unchanged except
//! for the missing `response_format`. Any other failure (network, auth, rate
//! limit) is returned as-is. There is no loop and no backoff: at most two
//! requests leave this module per analysis.

use crate::config::ModelConfig;
use crate::error::BriefingError;
use crate::finding::{StructuredFinding, SCHEMA_NAME};
use crate::prompts::{Prompt, PromptMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// One `{role, content}` entry of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// The `json_schema` block of a `response_format`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

/// Structured-output constraint attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

impl ResponseFormat {
    /// Strict schema constraint for [`StructuredFinding`].
    pub fn structured_finding() -> Self {
        Self::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: SCHEMA_NAME.to_string(),
                schema: StructuredFinding::json_schema(),
                strict: true,
            },
        }
    }
}

/// Body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// What a backend hands back from one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    /// Text of the first choice.
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// A hosted chat-completion endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request and return the first choice.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, BriefingError>;
}

/// Build the request for `prompt`, attaching the schema constraint in schema mode.
pub fn build_request(config: &ModelConfig, prompt: &Prompt) -> ChatRequest {
    ChatRequest {
        model: config.deployment.clone(),
        messages: vec![
            ChatMessage::system(&prompt.system),
            ChatMessage::user(&prompt.user),
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: match prompt.mode {
            PromptMode::Schema => Some(ResponseFormat::structured_finding()),
            PromptMode::Legacy => None,
        },
    }
}

/// Whether `err` reads like the endpoint refusing the schema parameter.
pub fn is_schema_rejection(err: &BriefingError) -> bool {
    err.to_string().to_lowercase().contains("json_schema")
}

/// Send the completion request for `prompt` and return the raw response text.
pub async fn invoke(
    backend: &dyn ChatBackend,
    config: &ModelConfig,
    prompt: &Prompt,
) -> Result<String, BriefingError> {
    let request = build_request(config, prompt);
    debug!(
        "Endpoint: {}, deployment: {}, API version: {}",
        config.endpoint, config.deployment, config.api_version
    );

    let response = match prompt.mode {
        PromptMode::Schema => {
            info!("Sending request with json_schema response format");
            let first = backend.complete(&request).await;
            match first {
                Ok(response) => response,
                Err(e) if is_schema_rejection(&e) => {
                    warn!("json_schema request rejected, retrying without it: {}", e);
                    let fallback = ChatRequest {
                        response_format: None,
                        ..request
                    };
                    backend.complete(&fallback).await?
                }
                Err(e) => return Err(e),
            }
        }
        PromptMode::Legacy => {
            warn!(
                "API version {} does not support json_schema (2024-08-01-preview or later required); using prompt-only format",
                config.api_version
            );
            backend.complete(&request).await?
        }
    };

    debug!(
        "{} prompt tokens, {} completion tokens",
        response.prompt_tokens, response.completion_tokens
    );

    let content = response.content.trim();
    if content.is_empty() {
        return Err(BriefingError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::build_prompt;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Result<ChatResponse, BriefingError>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<ChatResponse, BriefingError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<ChatRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for Scripted {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, BriefingError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .expect("no scripted reply left")
        }
    }

    fn ok(content: &str) -> Result<ChatResponse, BriefingError> {
        Ok(ChatResponse {
            content: content.into(),
            ..Default::default()
        })
    }

    fn config(version: &str) -> ModelConfig {
        ModelConfig::builder()
            .endpoint("https://x")
            .api_key("k")
            .deployment("gpt-4o")
            .api_version(version)
            .build()
            .unwrap()
    }

    #[test]
    fn request_serialises_schema_block() {
        let cfg = config("2024-08-01-preview");
        let prompt = build_prompt("本文", 8000, true);
        let body = serde_json::to_value(build_request(&cfg, &prompt)).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "analysis_result");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn legacy_request_omits_response_format() {
        let cfg = config("2024-02-15-preview");
        let prompt = build_prompt("本文", 8000, false);
        let body = serde_json::to_value(build_request(&cfg, &prompt)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn schema_rejection_retries_once_without_schema() {
        let backend = Scripted::new(vec![
            Err(BriefingError::Upstream {
                status: Some(400),
                message: "response_format value as json_schema is enabled only for api versions 2024-08-01-preview and later".into(),
            }),
            ok("{}"),
        ]);
        let prompt = build_prompt("本文", 8000, true);
        let out = invoke(&backend, &config("2024-08-01-preview"), &prompt).await.unwrap();
        assert_eq!(out, "{}");

        let seen = backend.seen();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].response_format.is_some());
        assert!(seen[1].response_format.is_none());
        assert_eq!(seen[0].messages, seen[1].messages);
    }

    #[tokio::test]
    async fn second_failure_propagates() {
        let backend = Scripted::new(vec![
            Err(BriefingError::Upstream {
                status: Some(400),
                message: "Invalid parameter: json_schema".into(),
            }),
            Err(BriefingError::Upstream {
                status: Some(500),
                message: "server error".into(),
            }),
        ]);
        let prompt = build_prompt("本文", 8000, true);
        let err = invoke(&backend, &config("2024-08-01-preview"), &prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, BriefingError::Upstream { status: Some(500), .. }));
        assert_eq!(backend.seen().len(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let backend = Scripted::new(vec![Err(BriefingError::Upstream {
            status: Some(429),
            message: "rate limit exceeded".into(),
        })]);
        let prompt = build_prompt("本文", 8000, true);
        let err = invoke(&backend, &config("2024-08-01-preview"), &prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, BriefingError::Upstream { status: Some(429), .. }));
        assert_eq!(backend.seen().len(), 1);
    }

    #[tokio::test]
    async fn legacy_mode_never_retries() {
        let backend = Scripted::new(vec![Err(BriefingError::Upstream {
            status: Some(400),
            message: "json_schema".into(),
        })]);
        let prompt = build_prompt("本文", 8000, false);
        assert!(invoke(&backend, &config("2024-02-15-preview"), &prompt)
            .await
            .is_err());
        assert_eq!(backend.seen().len(), 1);
    }

    #[tokio::test]
    async fn blank_content_is_empty_response() {
        let backend = Scripted::new(vec![ok("  \n")]);
        let prompt = build_prompt("本文", 8000, false);
        let err = invoke(&backend, &config("2024-02-15-preview"), &prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, BriefingError::EmptyResponse));
    }
}
