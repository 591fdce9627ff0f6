//! Commit message generation from a staged diff.

use std::sync::Arc;

use tracing::debug;

use crate::config::{GeneratorConfig, Settings};
use crate::error::ScribeError;
use crate::prompt::build_prompt;

use super::client::{CompletionClient, CompletionRequest};

/// Turns diff text into a commit message through a completion client.
#[derive(Clone)]
pub struct MessageGenerator {
    client: Arc<dyn CompletionClient>,
    settings: Arc<dyn Settings>,
    config: GeneratorConfig,
}

impl MessageGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        settings: Arc<dyn Settings>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            client,
            settings,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a commit message for `diff`.
    ///
    /// The credential is read on every call; when it is missing no request
    /// is sent. The returned text has surrounding whitespace removed.
    pub async fn generate(&self, diff: &str) -> Result<String, ScribeError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or(ScribeError::MissingCredential)?;

        let prompt = build_prompt(&self.config.template, diff);
        debug!(
            model = %self.config.model,
            template = %self.config.template,
            diff_len = diff.len(),
            prompt_len = prompt.len(),
            "requesting commit message"
        );

        let request = CompletionRequest {
            api_key,
            model: self.config.model.clone(),
            prompt,
            max_tokens: self.config.max_tokens,
        };

        let text = self.client.complete(&request).await?;
        Ok(text.trim().to_string())
    }
}
