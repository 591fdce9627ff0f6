//! commitscribe - drafts commit messages for staged changes.
//!
//! # Overview
//!
//! commitscribe watches git repositories. Whenever a repository's state
//! changes and it has staged changes, the staged diff (`git diff --cached`)
//! is sent to a text-generation API and the reply is written into the
//! repository's pending commit message field.
//!
//! The host environment (an editor, or the bundled terminal host in
//! [`host::local`]) supplies repositories, change notifications and error
//! display through the traits in [`host`].

pub mod config;
pub mod error;
pub mod git;
pub mod host;
pub mod llm;
pub mod prompt;
pub mod shutdown;
pub mod watcher;
pub mod workflow;

// Re-export commonly used types
pub use config::{EnvSettings, GeneratorConfig, Settings, StaticSettings};
pub use error::{DiffError, GenerationError, RepoError, ScribeError};
pub use host::{HostEvent, Notifier, Repository, RepositoryId};
pub use llm::{AnthropicClient, CompletionClient, CompletionRequest, MessageGenerator};
pub use prompt::PromptTemplate;
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use watcher::{WatchSummary, Watcher};
pub use workflow::{Outcome, Scribe};
