//! Configuration management for researchbench
//!
//! Supports environment variables, config files, and command-line overrides.
//! The research task and every model identifier are settings, not constants.
//!
//! Config file location: ~/.config/researchbench/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{BenchError, Result};
use crate::core::types::{AgentConfig, BackendKind, ResearchTask};

/// Task used when neither the config file nor the environment names one
pub const DEFAULT_TASK: &str = "where did the CEOs of the 10 largest space stocks right now go to college and what specific college experiences most impacted them?";

/// Main configuration for researchbench
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Research question sent to every backend
    #[serde(default = "default_task")]
    pub task: String,
    /// Run selection and limits
    #[serde(default)]
    pub bench: BenchConfig,
    /// HTTP agent service configuration
    #[serde(default)]
    pub http_service: ServiceConfig,
    /// In-process browser agent configuration
    #[serde(default)]
    pub browser_agent: BrowserAgentConfig,
}

/// Which backends run, in order, and how long each may take
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Backends in execution order
    pub backends: Vec<BackendKind>,
    /// Per-run timeout in seconds; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// HTTP agent service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service root URL (default: http://127.0.0.1:8000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model requested from the service
    pub model: String,
    /// Bearer token sent with the request; local services ignore it
    pub api_key: String,
    /// Cache directory wiped before each run (default: ~/.cache/blast)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Whether to wipe the cache directory before each run
    pub clear_cache: bool,
    /// Where the answer lives in the response payload:
    /// "responses", "chat_completion", or a JSON pointer such as "/answer"
    pub response_shape: String,
}

/// In-process browser agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserAgentConfig {
    /// Run the browser without a visible window
    pub headless: bool,
    /// Screenshot the page after every agent step and attach it to the next
    /// LLM request; also offers the `browser_screenshot` tool
    pub use_vision: bool,
    /// Model driving the agent
    pub model: String,
    /// OpenAI-compatible endpoint for the agent's LLM
    pub llm_base_url: String,
    /// API key for the LLM endpoint, read from OPENAI_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Maximum reasoning steps before the agent synthesizes an answer
    pub max_steps: usize,
    /// Timeout for a single LLM request in seconds
    pub request_timeout_secs: u64,
}

fn default_task() -> String {
    env::var("RESEARCHBENCH_TASK").unwrap_or_else(|_| DEFAULT_TASK.to_string())
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task: default_task(),
            bench: BenchConfig::default(),
            http_service: ServiceConfig::default(),
            browser_agent: BrowserAgentConfig::default(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                BackendKind::HttpAgentService,
                BackendKind::InProcessBrowserAgent,
            ],
            timeout_secs: env::var("RESEARCHBENCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("RESEARCHBENCH_SERVICE_URL").ok(),
            model: env::var("RESEARCHBENCH_SERVICE_MODEL")
                .unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            api_key: "not-needed".to_string(),
            cache_dir: None,
            clear_cache: true,
            response_shape: "responses".to_string(),
        }
    }
}

impl Default for BrowserAgentConfig {
    fn default() -> Self {
        Self {
            headless: env_flag("RESEARCHBENCH_HEADLESS", false),
            use_vision: env_flag("RESEARCHBENCH_VISION", false),
            model: env::var("RESEARCHBENCH_BROWSER_MODEL").unwrap_or_else(|_| "gpt-4.1".to_string()),
            llm_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("OPENAI_API_KEY").ok(),
            max_steps: 25,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("researchbench")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = Self::config_file();
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::with_context(format!("Failed to read config {}", path.display()), e)
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections fall back to defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| BenchError::config(format!("Failed to parse config: {}", e)))?;

        // Secrets never live in the file
        config.browser_agent.api_key = env::var("OPENAI_API_KEY").ok();

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.task.trim().is_empty() {
            return Err(BenchError::config("task must not be empty"));
        }
        if self.bench.backends.is_empty() {
            return Err(BenchError::config("at least one backend must be selected"));
        }
        if self.browser_agent.max_steps == 0 {
            return Err(BenchError::config("browser_agent.max_steps must be at least 1"));
        }
        Ok(())
    }

    /// The configured research task
    pub fn research_task(&self) -> ResearchTask {
        ResearchTask::new(self.task.clone())
    }

    /// Backend-specific settings for the given backend
    pub fn agent_config(&self, kind: BackendKind) -> AgentConfig {
        match kind {
            BackendKind::HttpAgentService => AgentConfig::HttpService {
                model_name: self.http_service.model.clone(),
                base_url: self.http_service.base_url.clone(),
            },
            BackendKind::InProcessBrowserAgent => AgentConfig::BrowserAgent {
                headless: self.browser_agent.headless,
                use_vision: self.browser_agent.use_vision,
                model_name: self.browser_agent.model.clone(),
            },
        }
    }

    /// Cache directory owned by the HTTP agent service
    pub fn service_cache_dir(&self) -> Option<PathBuf> {
        self.http_service
            .cache_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache").join("blast")))
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.bench.backends,
            vec![
                BackendKind::HttpAgentService,
                BackendKind::InProcessBrowserAgent
            ]
        );
        assert_eq!(config.http_service.api_key, "not-needed");
        assert_eq!(config.http_service.response_shape, "responses");
        assert!(config.http_service.clear_cache);
        assert_eq!(config.browser_agent.max_steps, 25);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
task = "what year was X founded?"

[bench]
backends = ["in-process-browser-agent"]
timeout_secs = 300

[browser_agent]
headless = true
"#,
        )
        .unwrap();

        assert_eq!(config.task, "what year was X founded?");
        assert_eq!(
            config.bench.backends,
            vec![BackendKind::InProcessBrowserAgent]
        );
        assert_eq!(config.bench.timeout_secs, Some(300));
        assert!(config.browser_agent.headless);
        assert_eq!(config.browser_agent.max_steps, 25);
    }

    #[test]
    fn test_empty_backend_list_rejected() {
        let result = Config::from_toml("[bench]\nbackends = []\n");
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_agent_config_per_backend() {
        let mut config = Config::default();
        config.http_service.base_url = Some("http://10.0.0.2:8000".to_string());
        config.http_service.model = "gpt-4.1-mini".to_string();
        config.browser_agent.model = "gpt-4.1".to_string();
        config.browser_agent.use_vision = true;

        assert_eq!(
            config.agent_config(BackendKind::HttpAgentService),
            AgentConfig::HttpService {
                model_name: "gpt-4.1-mini".to_string(),
                base_url: Some("http://10.0.0.2:8000".to_string()),
            }
        );

        match config.agent_config(BackendKind::InProcessBrowserAgent) {
            AgentConfig::BrowserAgent {
                use_vision,
                model_name,
                ..
            } => {
                assert!(use_vision);
                assert_eq!(model_name, "gpt-4.1");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_cache_dir_wins() {
        let mut config = Config::default();
        config.http_service.cache_dir = Some(PathBuf::from("/tmp/blast-cache"));
        assert_eq!(
            config.service_cache_dir(),
            Some(PathBuf::from("/tmp/blast-cache"))
        );
    }

    #[test]
    fn test_default_config_toml_round_trips() {
        let toml_str = Config::default_config_toml();
        assert!(toml_str.contains("[http_service]"));
        assert!(toml_str.contains("[browser_agent]"));
        assert!(!toml_str.contains("api_key = \"sk-"));
        assert!(Config::from_toml(&toml_str).is_ok());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "task = \"who founded X?\"\n").unwrap();
        assert_eq!(Config::load_from_path(&path).unwrap().task, "who founded X?");

        let err = Config::load_from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("researchbench"));
    }
}
