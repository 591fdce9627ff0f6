//! Error types for commitscribe modules using thiserror.

use thiserror::Error;

/// Errors from retrieving the staged diff.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to run git diff --cached: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git diff --cached exited with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// Errors from the text-generation API.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to the generation API failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Generation API returned {status}{}: {message}",
             kind.as_ref().map_or(String::new(), |k| format!(" ({k})")))]
    Api {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("Generation API returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure of one generation workflow, as seen at the task boundary.
#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("API key not set. Please set it in your settings.")]
    MissingCredential,

    #[error("Failed to get git diff: {0}")]
    DiffRetrieval(#[from] DiffError),

    #[error("Failed to generate commit message: {0}")]
    Generation(#[from] GenerationError),

    #[error("Operation canceled")]
    Cancelled,
}

impl ScribeError {
    /// Whether this failure comes from host teardown rather than a real fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ScribeError::Cancelled)
    }
}

/// Errors from inspecting repository state with git2.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Failed to open repository at {path}: {source}")]
    OpenRepository {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to read repository status: {0}")]
    Statuses(#[source] git2::Error),

    #[error("git was not found on PATH. Install git to retrieve staged diffs.")]
    GitNotInstalled,
}
