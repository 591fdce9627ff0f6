//! Completion client abstraction.

use std::fmt;

use async_trait::async_trait;

use crate::error::GenerationError;

/// One request/response completion call.
#[derive(Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("prompt_len", &self.prompt.len())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Trait for calling a hosted text-generation model.
///
/// This abstraction allows mocking the HTTP API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the request and return the generated text as received.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}
