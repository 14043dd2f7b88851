//! Scripted provider for tests and offline runs.
//!
//! [`ScriptedProvider`] replays a queue of canned replies and records every
//! request it receives, so a generation can be driven end to end without a
//! network.

use super::{ChatProvider, ChatRequest};
use crate::error::ProviderError;
use crate::types::{ChatMessage, InferenceResponse, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
enum Step {
    Reply(InferenceResponse),
    Fail(String),
    Hang,
}

/// A request as seen by the scripted provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

/// Queue-based fake provider.
///
/// Each exchange pops the next scripted step. An exhausted script fails the
/// exchange with [`ProviderError::Other`].
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    pushed: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary reply.
    pub fn push_response(&self, response: InferenceResponse) -> &Self {
        self.push(Step::Reply(response))
    }

    /// Queue a text-only reply.
    pub fn push_text(&self, text: &str) -> &Self {
        self.push_response(InferenceResponse::text(text))
    }

    /// Queue a reply requesting `(name, arguments)` tool calls. Call ids are
    /// assigned as `call_<step>_<index>`, where `step` counts every step
    /// pushed so far, so ids stay unique across the provider's lifetime.
    pub fn push_tool_calls(&self, calls: &[(&str, &str)]) -> &Self {
        let step = self.pushed.load(Ordering::SeqCst);
        let tool_calls = calls
            .iter()
            .enumerate()
            .map(|(i, (name, arguments))| ToolCall {
                id: format!("call_{step}_{i}"),
                name: (*name).to_string(),
                arguments: (*arguments).to_string(),
            })
            .collect();
        self.push_response(InferenceResponse::with_tool_calls(tool_calls))
    }

    /// Queue a failed exchange.
    pub fn push_error(&self, message: &str) -> &Self {
        self.push(Step::Fail(message.to_string()))
    }

    /// Queue an exchange that never completes.
    pub fn push_hang(&self) -> &Self {
        self.push(Step::Hang)
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of exchanges attempted so far.
    pub fn exchange_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, step: Step) -> &Self {
        self.lock_steps().push_back(step);
        self.pushed.fetch_add(1, Ordering::SeqCst);
        self
    }

    fn lock_steps(&self) -> std::sync::MutexGuard<'_, VecDeque<Step>> {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<InferenceResponse, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                model: request.model.to_string(),
                temperature: request.temperature,
                messages: request.messages.to_vec(),
                tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            });

        let step = self.lock_steps().pop_front();
        match step {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(ProviderError::Other(anyhow::anyhow!(message))),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(ProviderError::Other(anyhow::anyhow!(
                "scripted provider has no reply left"
            ))),
        }
    }
}
