//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerationError;

use super::client::{CompletionClient, CompletionRequest};

/// Value of the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// Longest slice of a response body quoted in error messages.
const MAX_QUOTED_BODY: usize = 500;

// -- Messages API request/response types ---

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Completion client for `POST {base_url}/v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .user_agent(concat!("commitscribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GenerationError::ClientBuild)?;

        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &request.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(GenerationError::Transport)?;

        if !status.is_success() {
            let err = api_error(status.as_u16(), &text);
            warn!(status = status.as_u16(), "generation API returned an error");
            return Err(err);
        }

        parse_response(&text)
    }
}

fn quote(body: &str) -> String {
    body.chars().take(MAX_QUOTED_BODY).collect()
}

/// Convert a non-2xx response into an API error, keeping the API's own
/// error type and message when the body carries them.
fn api_error(status: u16, body: &str) -> GenerationError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => GenerationError::Api {
            status,
            kind: Some(parsed.error.kind),
            message: parsed.error.message,
        },
        Err(_) => GenerationError::Api {
            status,
            kind: None,
            message: if body.trim().is_empty() {
                "empty response body".to_string()
            } else {
                quote(body.trim())
            },
        },
    }
}

/// Concatenate the text blocks of a successful response.
fn parse_response(body: &str) -> Result<String, GenerationError> {
    let parsed: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::MalformedResponse(format!("{}. Body: {}", e, quote(body)))
    })?;

    let mut text_blocks = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .peekable();

    if text_blocks.peek().is_none() {
        return Err(GenerationError::MalformedResponse(
            "response contained no text content".to_string(),
        ));
    }

    Ok(text_blocks.collect())
}
