//! Core generation loop: ask the model, run the tools it requests, repeat.
//!
//! Each round-trip:
//! 1. Sends the transcript and tool declarations to the provider
//! 2. Appends the assistant turn
//! 3. Returns if the turn requested no tools
//! 4. Otherwise executes every requested tool, in order, and appends one
//!    tool turn per request
//!
//! The loop is bounded by a round-trip ceiling and fails hard when it is
//! reached, so a truncated chain of tool calls is never returned as an
//! answer.

use crate::agent::context;
use crate::error::GenerateError;
use crate::provider::{ChatProvider, ChatRequest};
use crate::tools::ToolRegistry;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Round-trips allowed per generation unless overridden.
pub const DEFAULT_ROUNDTRIP_LIMIT: u32 = 10;

/// What to do when a tool's arguments do not parse or its logic fails.
///
/// An unknown tool name is always fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorPolicy {
    /// Abort the whole generation with [`GenerateError::Tool`].
    #[default]
    Abort,
    /// Append `error: <message>` as the tool result and keep going.
    Report,
}

/// Tunables for a [`Generator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    pub temperature: f32,
    pub roundtrip_limit: u32,
    pub tool_error_policy: ToolErrorPolicy,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            roundtrip_limit: DEFAULT_ROUNDTRIP_LIMIT,
            tool_error_policy: ToolErrorPolicy::Abort,
        }
    }
}

/// Drives tool-calling generations against one provider and model.
#[derive(Debug, Clone)]
pub struct Generator<P> {
    provider: P,
    model: String,
    options: GeneratorOptions,
}

impl<P: ChatProvider> Generator<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Run one generation to completion.
    ///
    /// `cancel` is honoured while waiting on the provider; a tool that is
    /// already running is allowed to finish first.
    pub async fn generate(
        &self,
        tools: &ToolRegistry,
        system_prompt: &str,
        user_prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Generation, GenerateError> {
        let tool_defs = tools.definitions();
        let mut messages = context::build_messages(system_prompt, user_prompt);
        let mut usage = TokenUsage::default();
        let limit = self.options.roundtrip_limit;

        info!(
            "Starting generation with model '{}' ({} tools, limit {})",
            self.model,
            tool_defs.len(),
            limit
        );

        for roundtrip in 0..limit {
            let request = ChatRequest {
                model: &self.model,
                temperature: self.options.temperature,
                messages: &messages,
                tools: &tool_defs,
            };

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[Roundtrip {}] Cancelled", roundtrip);
                    return Err(GenerateError::Cancelled);
                }
                resp = self.provider.complete(request) => resp?,
            };

            usage += response.usage;
            messages.push(response.to_message());

            if response.tool_calls.is_empty() {
                let text = response.content.unwrap_or_default();
                info!(
                    "[Roundtrip {}] Final answer: {} chars",
                    roundtrip,
                    text.len()
                );
                return Ok(Generation {
                    text,
                    roundtrips: roundtrip,
                    transcript: messages,
                    usage,
                });
            }

            for tc in &response.tool_calls {
                info!("[Roundtrip {}] Tool: {}({})", roundtrip, tc.name, tc.arguments);

                let tool = tools
                    .resolve(&tc.name)
                    .ok_or_else(|| GenerateError::ToolNotFound {
                        name: tc.name.clone(),
                    })?;

                let output = match tool.execute(&tc.arguments).await {
                    Ok(output) => {
                        debug!("[Roundtrip {}] Tool result: {} chars", roundtrip, output.len());
                        output
                    }
                    Err(e) => {
                        warn!("[Roundtrip {}] Tool {} failed: {}", roundtrip, tc.name, e);
                        match self.options.tool_error_policy {
                            ToolErrorPolicy::Abort => {
                                return Err(GenerateError::Tool {
                                    name: tc.name.clone(),
                                    source: e,
                                });
                            }
                            ToolErrorPolicy::Report => format!("error: {e}"),
                        }
                    }
                };

                messages.push(ChatMessage::tool_result(tc, output));
            }

            debug_assert!(context::unanswered_tool_calls(&messages).is_empty());
        }

        warn!("Round-trip limit {} reached without a final answer", limit);
        Err(GenerateError::RoundtripLimitExceeded { limit })
    }
}

/// One-shot generation with default options and no cancellation.
pub async fn generate<P: ChatProvider>(
    provider: P,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
    temperature: f32,
    tools: &ToolRegistry,
) -> Result<Generation, GenerateError> {
    Generator::new(provider, model)
        .with_temperature(temperature)
        .generate(tools, system_prompt, user_prompt, &CancellationToken::new())
        .await
}
