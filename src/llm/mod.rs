//! Text-generation API access and commit message generation.

pub mod anthropic;
pub mod client;
pub mod generator;

pub use anthropic::AnthropicClient;
pub use client::{CompletionClient, CompletionRequest};
pub use generator::MessageGenerator;
