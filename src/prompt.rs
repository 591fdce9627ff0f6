//! Prompt construction for generated commit messages.

use std::fmt;
use std::str::FromStr;

/// Placeholder marking where the diff goes in a custom template.
pub const DIFF_PLACEHOLDER: &str = "{diff}";

const CONCISE_TEMPLATE: &str = "Based on the following git diff, write a concise and informative commit message:

{diff}

Commit message:";

const CONVENTIONAL_TEMPLATE: &str = r#"You are writing a Git commit message for the staged changes below.

Follow the Conventional Commits format:

<type>(<scope>): <subject>

<body>

<footer>

Rules:
- type: one of feat, fix, docs, style, refactor, perf, test, build, ci, chore
- scope: optional, the module or area most affected
- subject: imperative mood, lowercase, no period, at most 50 characters
- body: optional, explain what changed and why, wrap at 72 characters
- footer: optional, only for BREAKING CHANGE notes or issue references
- Omit the body and footer for small changes.

Respond with the commit message only, no explanation and no code fences.

Staged diff:

{diff}"#;

/// Instructional wording wrapped around the diff.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PromptTemplate {
    /// Short "concise and informative" request.
    Concise,
    /// type(scope): subject, body, footer.
    #[default]
    Conventional,
    /// Caller-supplied text; see [`DIFF_PLACEHOLDER`].
    Custom(String),
}

impl PromptTemplate {
    pub fn text(&self) -> &str {
        match self {
            PromptTemplate::Concise => CONCISE_TEMPLATE,
            PromptTemplate::Conventional => CONVENTIONAL_TEMPLATE,
            PromptTemplate::Custom(text) => text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::Concise => "concise",
            PromptTemplate::Conventional => "conventional",
            PromptTemplate::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PromptTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concise" => Ok(PromptTemplate::Concise),
            "conventional" => Ok(PromptTemplate::Conventional),
            other => Err(format!(
                "unknown template '{other}' (expected 'concise' or 'conventional')"
            )),
        }
    }
}

/// Build the prompt for a diff.
///
/// The diff is embedded verbatim at the first `{diff}` placeholder. A custom
/// template without a placeholder gets the diff appended after a blank line.
/// The template is split before insertion, so placeholder text inside the
/// diff itself is never expanded.
pub fn build_prompt(template: &PromptTemplate, diff: &str) -> String {
    let text = template.text();

    match text.split_once(DIFF_PLACEHOLDER) {
        Some((before, after)) => {
            let mut prompt = String::with_capacity(before.len() + diff.len() + after.len());
            prompt.push_str(before);
            prompt.push_str(diff);
            prompt.push_str(after);
            prompt
        }
        None => format!("{}\n\n{}", text.trim_end(), diff),
    }
}
