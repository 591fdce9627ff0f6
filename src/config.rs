//! Generator configuration and the credential settings surface.

use std::env;

use tracing::warn;

use crate::prompt::PromptTemplate;

/// Default hosted model used to draft commit messages.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Default cap on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Default API root for the Anthropic Messages endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable consulted by [`EnvSettings::default`].
pub const DEFAULT_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

const MODEL_ENV_VAR: &str = "COMMITSCRIBE_MODEL";
const MAX_TOKENS_ENV_VAR: &str = "COMMITSCRIBE_MAX_TOKENS";
const BASE_URL_ENV_VAR: &str = "COMMITSCRIBE_BASE_URL";

/// Fixed model/length configuration for generation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub template: PromptTemplate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
            template: PromptTemplate::default(),
        }
    }
}

impl GeneratorConfig {
    /// Build a config from defaults overridden by `COMMITSCRIBE_*` variables.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(model) = non_empty_var(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(base_url) = non_empty_var(BASE_URL_ENV_VAR) {
            config.base_url = base_url;
        }
        config.max_tokens = max_tokens_from_env();

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read the token cap, falling back to the default on empty, zero or garbage.
fn max_tokens_from_env() -> u32 {
    match env::var(MAX_TOKENS_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}",
                    MAX_TOKENS_ENV_VAR, v, DEFAULT_MAX_TOKENS
                );
                DEFAULT_MAX_TOKENS
            }
        },
        _ => DEFAULT_MAX_TOKENS,
    }
}

/// Source of the API credential, consulted on every generation.
pub trait Settings: Send + Sync {
    /// The configured API key, if any. Empty strings count as absent.
    fn api_key(&self) -> Option<String>;
}

/// A credential fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    api_key: Option<String>,
}

impl StaticSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Settings for StaticSettings {
    fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }
}

/// A credential read from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    var: String,
}

impl EnvSettings {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_VAR)
    }
}

impl Settings for EnvSettings {
    fn api_key(&self) -> Option<String> {
        non_empty_var(&self.var)
    }
}
