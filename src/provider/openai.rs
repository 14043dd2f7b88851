//! OpenAI-compatible chat completions client.
//!
//! Supports tool-use (function calling) in the `/v1/chat/completions` format.

use super::{ChatProvider, ChatRequest};
use crate::error::ProviderError;
use crate::tools::ToolDefinition;
use crate::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inference client for any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    max_tokens: Option<u32>,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequestPayload<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: ChatRole,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl<'a> From<&'a ChatMessage> for MessagePayload<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        let mut payload = MessagePayload {
            role: message.role(),
            content: message.content(),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        };
        match message {
            ChatMessage::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
                payload.tool_calls = Some(
                    tool_calls
                        .iter()
                        .map(|tc| ToolCallPayload {
                            id: tc.id.clone(),
                            r#type: function_type(),
                            function: FunctionCallPayload {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect(),
                );
            }
            ChatMessage::Tool {
                tool_call_id, name, ..
            } => {
                payload.tool_call_id = Some(tool_call_id.as_str());
                payload.name = Some(name.as_str());
            }
            _ => {}
        }
        payload
    }
}

impl<'a> From<&'a ToolDefinition> for ToolPayload<'a> {
    fn from(def: &'a ToolDefinition) -> Self {
        ToolPayload {
            r#type: "function",
            function: FunctionPayload {
                name: &def.name,
                description: &def.description,
                parameters: &def.parameters,
            },
        }
    }
}

impl OpenAiClient {
    /// Create a new client. `base_url` excludes the `/v1` suffix.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_tokens: None,
            http: reqwest::Client::new(),
        }
    }

    /// Cap completion tokens per exchange.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<InferenceResponse, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(ToolPayload::from).collect())
        };

        let payload = ChatRequestPayload {
            model: request.model,
            messages: request.messages.iter().map(MessagePayload::from).collect(),
            tools,
            max_tokens: self.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "Inference request to model {} ({} messages, {} tools)",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let body: ChatResponse =
            serde_json::from_str(&body).map_err(ProviderError::Decode)?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(InferenceResponse {
            content: choice.message.content,
            tool_calls,
            usage,
        })
    }
}
