//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use git2::{Repository as GitRepository, Signature};

use commitscribe::{
    AnthropicClient, GeneratorConfig, MessageGenerator, Notifier, PromptTemplate, Repository,
    Scribe, StaticSettings,
};
use commitscribe::git::GitCli;

/// A Messages API reply carrying `text`.
pub fn messages_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    })
}

/// A Messages API error body.
pub fn error_reply(kind: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "error",
        "error": {"type": kind, "message": message}
    })
}

/// In-memory repository handle with a settable staged count.
pub struct FakeRepo {
    root: PathBuf,
    staged: AtomicUsize,
    message: Mutex<String>,
}

impl FakeRepo {
    pub fn new(root: impl Into<PathBuf>, staged: usize) -> Arc<Self> {
        Arc::new(Self {
            root: root.into(),
            staged: AtomicUsize::new(staged),
            message: Mutex::new(String::new()),
        })
    }

    pub fn set_staged(&self, staged: usize) {
        self.staged.store(staged, Ordering::SeqCst);
    }
}

impl Repository for FakeRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn staged_count(&self) -> usize {
        self.staged.load(Ordering::SeqCst)
    }

    fn commit_message(&self) -> String {
        self.message.lock().unwrap().clone()
    }

    fn set_commit_message(&self, message: &str) {
        *self.message.lock().unwrap() = message.to_string();
    }
}

/// Notifier that records every message shown.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, message: &str) {
        self.shown.lock().unwrap().push(message.to_string());
    }
}

/// Build a scribe that talks to `base_url` with the real git CLI.
pub fn scribe_for(base_url: &str, api_key: &str, notifier: Arc<RecordingNotifier>) -> Scribe {
    let config = GeneratorConfig {
        model: "claude-test".to_string(),
        max_tokens: 100,
        base_url: base_url.to_string(),
        template: PromptTemplate::Conventional,
    };
    let client = AnthropicClient::new(base_url).expect("Failed to build client");
    let generator = MessageGenerator::new(
        Arc::new(client),
        Arc::new(StaticSettings::new(api_key)),
        config,
    );
    Scribe::new(Arc::new(GitCli::new()), generator, notifier)
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: GitRepository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = GitRepository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file and add it to the index.
    pub fn stage(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is in the index.
    pub fn commit(&self, message: &str) {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit");
    }
}
