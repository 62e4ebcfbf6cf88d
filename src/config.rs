use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Error: {0} environment variable not set")]
    MissingEnv(&'static str),
}

/// Read a required environment variable, failing with a descriptive error
/// instead of a panic. Used for the two mandatory credentials.
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

/// The two bearer credentials every AI-assisted pipeline needs.
///
/// Validated once at binary startup; a missing variable is a fatal error and
/// the process exits with status 1 before any API call is made.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub github_token: String,
    pub openai_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            github_token: require_env("GITHUB_TOKEN")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
        })
    }
}

/// Top-level configuration loaded from .baubles-bot.toml.
///
/// All fields are optional — the tools work with zero config, talking to the
/// public GitHub and OpenAI endpoints with their stock defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API (overridable for GitHub Enterprise).
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible completion API.
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model name sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Login of the automation identity; comments by this account count as
    /// prior automated responses when deciding whether to respond again.
    #[serde(default = "default_bot_login")]
    pub login: String,

    /// Git ref used when dispatching follow-up workflows.
    #[serde(default = "default_workflow_ref")]
    pub workflow_ref: String,
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_bot_login() -> String {
    "github-actions[bot]".to_string()
}

fn default_workflow_ref() -> String {
    "master".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_model(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            login: default_bot_login(),
            workflow_ref: default_workflow_ref(),
        }
    }
}

impl Config {
    /// Load configuration from .baubles-bot.toml in the current directory,
    /// falling back to defaults when the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".baubles-bot.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
