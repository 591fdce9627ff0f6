//! commitscribe - terminal host entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commitscribe::config::DEFAULT_API_KEY_VAR;
use commitscribe::git::{GitCli, check_git_installed, is_repository};
use commitscribe::host::{LocalRepository, MessageUpdate, Poller};
use commitscribe::{
    AnthropicClient, EnvSettings, GeneratorConfig, MessageGenerator, Notifier, PromptTemplate,
    Repository, Scribe, Watcher, shutdown,
};

/// Lower bound for the polling interval.
const MIN_INTERVAL_MS: u64 = 50;

/// Draft commit messages for staged changes using an LLM.
#[derive(Parser, Debug)]
#[command(name = "commitscribe")]
#[command(about = "Watch repositories and draft commit messages for staged changes")]
#[command(version)]
struct Cli {
    /// Repository roots to watch (paths that are not repositories yet are
    /// picked up once they become one)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Model identifier (overrides COMMITSCRIBE_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Maximum tokens to generate (overrides COMMITSCRIBE_MAX_TOKENS)
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Built-in prompt template: concise or conventional
    #[arg(long)]
    template: Option<PromptTemplate>,

    /// Read the prompt template from a file; `{diff}` marks the diff position
    #[arg(long, conflicts_with = "template")]
    template_file: Option<PathBuf>,

    /// API root (overrides COMMITSCRIBE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Environment variable holding the API key
    #[arg(long, default_value = DEFAULT_API_KEY_VAR)]
    api_key_env: String,

    /// Status polling interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shows errors on stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "commitscribe=debug"
    } else {
        "commitscribe=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::from_env();

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(max_tokens) = cli.max_tokens {
        anyhow::ensure!(max_tokens > 0, "--max-tokens must be greater than zero");
        config.max_tokens = max_tokens;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(template) = &cli.template {
        config.template = template.clone();
    }
    if let Some(path) = &cli.template_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file {}", path.display()))?;
        config.template = PromptTemplate::Custom(text);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Check prerequisites
    check_git_installed().context("git is required to read staged diffs")?;

    let config = build_config(&cli)?;
    let settings = EnvSettings::new(&cli.api_key_env);
    if settings.var().is_empty() {
        anyhow::bail!("--api-key-env must not be empty");
    }
    if std::env::var(settings.var()).map_or(true, |v| v.trim().is_empty()) {
        // Read again at generation time; setting it later is fine.
        warn!("{} is not set; generation will fail until it is", settings.var());
    }

    info!(
        model = %config.model,
        max_tokens = config.max_tokens,
        template = %config.template,
        "starting"
    );

    // Step 2: Build the generator pipeline
    let client = AnthropicClient::new(config.base_url.clone())
        .context("Failed to create HTTP client")?;
    let generator = MessageGenerator::new(Arc::new(client), Arc::new(settings), config);
    let scribe = Arc::new(Scribe::new(
        Arc::new(GitCli::new()),
        generator,
        Arc::new(TerminalNotifier),
    ));

    // Step 3: Split paths into startup repositories and ones to wait for
    let (sink_tx, sink_rx) = mpsc::unbounded_channel();
    let mut startup = Vec::new();
    let mut pending = Vec::new();
    for path in &cli.paths {
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
        if is_repository(&path) {
            startup.push(Arc::new(LocalRepository::new(path).with_sink(sink_tx.clone())));
        } else {
            info!(path = %path.display(), "not a repository yet; waiting");
            pending.push(path);
        }
    }

    let (trigger, shutdown) = shutdown::channel();
    let (events_tx, events_rx) = mpsc::channel(64);

    let watcher = Watcher::new(
        scribe,
        startup.iter().map(|r| Arc::clone(r) as Arc<dyn Repository>),
        shutdown.clone(),
    );
    let poller = Poller::new(
        startup,
        pending,
        Duration::from_millis(cli.interval_ms.max(MIN_INTERVAL_MS)),
        events_tx,
    )
    .with_sink(sink_tx);

    tokio::spawn(print_messages(sink_rx));
    let poller_handle = tokio::spawn(poller.run(shutdown.clone()));
    let watcher_handle = tokio::spawn(watcher.run(events_rx));

    println!("Watching for staged changes. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("stopping");
    trigger.trigger();

    let _ = poller_handle.await;
    let summary = watcher_handle.await.context("Watcher task failed")?;
    info!(
        written = summary.written,
        skipped = summary.skipped,
        failed = summary.failed,
        cancelled = summary.cancelled,
        "stopped"
    );

    Ok(())
}

/// Print every commit message written into a repository's field.
async fn print_messages(mut updates: mpsc::UnboundedReceiver<MessageUpdate>) {
    while let Some(update) = updates.recv().await {
        println!("\n── {} ──\n{}\n", update.repo, update.message);
    }
}
