//! Chat-completion providers.
//!
//! The generation loop talks to a model only through [`ChatProvider`]:
//! one request carrying the transcript and tool declarations, one assistant
//! turn back.

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod openai;

#[cfg(any(test, feature = "test-util"))]
pub use mock::ScriptedProvider;
pub use openai::OpenAiClient;

use crate::error::ProviderError;
use crate::tools::ToolDefinition;
use crate::types::{ChatMessage, InferenceResponse};
use async_trait::async_trait;

/// One provider exchange.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: &'a [ChatMessage],
    pub tools: &'a [ToolDefinition],
}

/// A remote (or scripted) chat-completion model.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send the request and return the assistant's reply.
    async fn complete(&self, request: ChatRequest<'_>) -> Result<InferenceResponse, ProviderError>;
}

#[async_trait]
impl<P: ChatProvider + ?Sized> ChatProvider for std::sync::Arc<P> {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<InferenceResponse, ProviderError> {
        (**self).complete(request).await
    }
}
