//! Azure OpenAI chat-completion backend.

use crate::config::ModelConfig;
use crate::error::BriefingError;
use crate::pipeline::llm::{ChatBackend, ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// [`ChatBackend`] talking to an Azure OpenAI deployment over HTTPS.
///
/// No request timeout is set; the transport defaults apply.
pub struct AzureOpenAiClient {
    client: Client,
    url: String,
    api_key: String,
}

impl AzureOpenAiClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            client: Client::new(),
            url: completions_url(config),
            api_key: config.api_key.clone(),
        }
    }

    /// Fully qualified request URL, including the `api-version` query.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `{endpoint}/chat/completions?api-version={version}`.
pub fn completions_url(config: &ModelConfig) -> String {
    format!(
        "{}/chat/completions?api-version={}",
        config.endpoint, config.api_version
    )
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

#[async_trait]
impl ChatBackend for AzureOpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, BriefingError> {
        debug!("POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BriefingError::Upstream {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BriefingError::Upstream {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let body: CompletionBody = response.json().await.map_err(|e| BriefingError::Upstream {
            status: Some(status.as_u16()),
            message: format!("unreadable completion body: {}", e),
        })?;

        parse_completion(body)
    }
}

fn parse_completion(body: CompletionBody) -> Result<ChatResponse, BriefingError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(BriefingError::EmptyResponse)?;

    let (prompt_tokens, completion_tokens) = body
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(ChatResponse {
        content,
        prompt_tokens,
        completion_tokens,
    })
}
