//! Configuration loading, validation, and management for RustCrew.
//!
//! Loads configuration from `~/.rustcrew/config.toml` (or an explicit path)
//! with environment variable overrides. The same file carries the crew
//! manifest: goal, agents, tasks, and how tasks are routed.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.rustcrew/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model, used by agents that don't name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// The crew manifest
    #[serde(default)]
    pub crew: CrewConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("tools", &self.tools)
            .field("crew", &self.crew)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub file_write: FileWriteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWriteConfig {
    /// Directories writes must stay inside. Empty = anywhere.
    #[serde(default)]
    pub allowed_roots: Vec<String>,

    /// Path prefixes that are never written.
    #[serde(default = "default_forbidden_paths")]
    pub forbidden_paths: Vec<String>,
}

fn default_forbidden_paths() -> Vec<String> {
    vec!["/etc".into(), "/usr".into(), "~/.ssh".into(), "~/.aws".into()]
}

impl Default for FileWriteConfig {
    fn default() -> Self {
        Self {
            allowed_roots: Vec::new(),
            forbidden_paths: default_forbidden_paths(),
        }
    }
}

/// How the crew picks an agent for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// First agent whose goal contains any word of the task
    #[default]
    Keyword,
    /// Ask the completion service to name the best agent
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    /// The crew's overall goal
    #[serde(default = "default_goal")]
    pub goal: String,

    #[serde(default)]
    pub selection: SelectionStrategy,

    /// Messages prepended to every agent conversation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chat_history: Vec<HistoryEntry>,

    #[serde(default)]
    pub agents: Vec<AgentEntry>,

    /// Tasks assigned in order by `rustcrew run`
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Whether `run` ends with a synthesis over shared memory
    #[serde(default = "default_true")]
    pub summarize: bool,
}

fn default_goal() -> String {
    "Develop and present a concise overview of the assigned topic.".into()
}
fn default_true() -> bool {
    true
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            goal: default_goal(),
            selection: SelectionStrategy::default(),
            chat_history: Vec::new(),
            agents: vec![
                AgentEntry {
                    name: "Researcher".into(),
                    goal: "Conduct research and provide concise summaries".into(),
                    expected_output: Some("Bullet points or short paragraphs".into()),
                    model: None,
                    temperature: None,
                    tools: vec![],
                },
                AgentEntry {
                    name: "Writer".into(),
                    goal: "Summarize findings into cohesive reports and save files".into(),
                    expected_output: Some("Structured report with sections and summaries".into()),
                    model: None,
                    temperature: None,
                    tools: vec!["file_write".into()],
                },
            ],
            tasks: vec![
                "Research the topic and summarize it in 3 bullet points".into(),
                "Write up findings, save to report.md".into(),
            ],
            summarize: true,
        }
    }
}

/// One chat-history message in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// "system", "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// One agent in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,

    pub goal: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,

    /// Falls back to `default_model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Falls back to `default_temperature`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Built-in tool names bound to this agent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.rustcrew/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RUSTCREW_API_KEY`, then `OPENAI_API_KEY`, then `GROQ_API_KEY`
    /// - `RUSTCREW_PROVIDER`, `RUSTCREW_MODEL`
    /// - `RUSTCREW_API_URL`: base URL of the default provider
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from `path` and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            agents = config.crew.agents.len(),
            tasks = config.crew.tasks.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("RUSTCREW_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("GROQ_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("RUSTCREW_PROVIDER") {
            self.default_provider = provider;
        }

        if let Ok(model) = std::env::var("RUSTCREW_MODEL") {
            self.default_model = model;
        }

        if let Ok(url) = std::env::var("RUSTCREW_API_URL") {
            self.providers
                .entry(self.default_provider.clone())
                .or_default()
                .api_url = Some(url);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rustcrew")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.crew.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::ValidationError("agent name must not be empty".into()));
            }
            if agent.goal.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}' has an empty goal",
                    agent.name
                )));
            }
            if !seen.insert(agent.name.to_lowercase()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
            if let Some(t) = agent.temperature
                && !(0.0..=2.0).contains(&t)
            {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}' temperature must be between 0.0 and 2.0",
                    agent.name
                )));
            }
        }

        for entry in &self.crew.chat_history {
            if !matches!(entry.role.as_str(), "system" | "user" | "assistant") {
                return Err(ConfigError::ValidationError(format!(
                    "chat_history role '{}' is not one of system, user, assistant",
                    entry.role
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            tools: ToolsConfig::default(),
            crew: CrewConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
