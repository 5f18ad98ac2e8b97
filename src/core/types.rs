//! Shared types used across researchbench modules
//!
//! Contains the benchmark data model (tasks, backend configuration, run
//! results) and the message/tool structures spoken to the LLM.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A research question handed to every backend unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchTask(String);

impl ResearchTask {
    /// Create a new task from its question text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The question text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResearchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResearchTask {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// The research-agent backends the harness can compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Agent system reached over its HTTP API
    HttpAgentService,
    /// Browser automation agent driven by this process
    InProcessBrowserAgent,
}

impl BackendKind {
    /// Stable identifier used on the command line and in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::HttpAgentService => "http-agent-service",
            BackendKind::InProcessBrowserAgent => "in-process-browser-agent",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http-agent-service" | "http" | "blast" => Ok(BackendKind::HttpAgentService),
            "in-process-browser-agent" | "browser" | "browser-use" => {
                Ok(BackendKind::InProcessBrowserAgent)
            }
            other => Err(format!(
                "unknown backend '{}' (expected http-agent-service or in-process-browser-agent)",
                other
            )),
        }
    }
}

/// Per-backend settings; each variant carries only the fields its backend reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentConfig {
    /// Settings for the in-process browser agent
    BrowserAgent {
        headless: bool,
        use_vision: bool,
        model_name: String,
    },
    /// Settings for the HTTP agent service
    HttpService {
        model_name: String,
        /// Service root; `None` means the local default
        base_url: Option<String>,
    },
}

impl AgentConfig {
    /// Backend this configuration belongs to
    pub fn kind(&self) -> BackendKind {
        match self {
            AgentConfig::BrowserAgent { .. } => BackendKind::InProcessBrowserAgent,
            AgentConfig::HttpService { .. } => BackendKind::HttpAgentService,
        }
    }

    /// Model identifier requested from the backend
    pub fn model_name(&self) -> &str {
        match self {
            AgentConfig::BrowserAgent { model_name, .. } => model_name,
            AgentConfig::HttpService { model_name, .. } => model_name,
        }
    }
}

/// How a single run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The backend produced a final answer
    Success { text: String },
    /// The backend failed; the description is what gets reported
    Failure { error_description: String },
}

impl Outcome {
    /// Create a successful outcome
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    /// Create a failed outcome
    pub fn failure(error_description: impl Into<String>) -> Self {
        Self::Failure {
            error_description: error_description.into(),
        }
    }

    /// Whether the run succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Result of one timed backend invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    backend_kind: BackendKind,
    elapsed_seconds: f64,
    outcome: Outcome,
}

impl RunResult {
    /// Build a result; negative or non-finite timings are clamped to zero
    pub fn new(backend_kind: BackendKind, elapsed_seconds: f64, outcome: Outcome) -> Self {
        let elapsed_seconds = if elapsed_seconds.is_finite() && elapsed_seconds > 0.0 {
            elapsed_seconds
        } else {
            0.0
        };

        Self {
            backend_kind,
            elapsed_seconds,
            outcome,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend_kind
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// A message in an LLM exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Base64 PNG screenshots attached for vision-capable models
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attach a screenshot to this message
    pub fn with_image(mut self, base64_png: impl Into<String>) -> Self {
        self.images.push(base64_png.into());
        self
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get an unsigned integer argument by key
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Result of executing a browser action
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output from the tool
    pub output: String,
    /// Optional structured data
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
            data: None,
        }
    }

    /// Create a successful result with structured data
    pub fn success_with_data(
        tool_name: impl Into<String>,
        output: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
            data: Some(data),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
            data: None,
        }
    }
}
