//! Custom error types for researchbench
//!
//! Every backend failure is funneled into [`BenchError`] so adapters can turn
//! it into a failed run outcome with a readable description.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for researchbench operations
#[derive(Error, Debug)]
pub enum BenchError {
    /// HTTP agent service errors (connection, status, payload)
    #[error("Agent service error: {0}")]
    Service(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// LLM endpoint errors raised while driving the browser agent
    #[error("LLM error: {0}")]
    Llm(String),

    /// Failure reported by a research agent while executing a task
    #[error("{0}")]
    Agent(String),

    /// The service answered but the expected answer field was missing
    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    /// Clearing the service cache directory failed
    #[error("Failed to clear cache directory {}: {source}", path.display())]
    CacheCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run exceeded its time budget
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed endpoint URLs
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for researchbench operations
pub type Result<T> = std::result::Result<T, BenchError>;

impl BenchError {
    /// Create an agent service error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create an agent failure
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_is_verbatim() {
        let err = BenchError::agent("navigation timeout");
        assert_eq!(err.to_string(), "navigation timeout");
    }

    #[test]
    fn test_timeout_display() {
        let err = BenchError::Timeout(Duration::from_secs(90));
        assert_eq!(err.to_string(), "timed out after 90s");
    }

    #[test]
    fn test_cache_cleanup_display() {
        let err = BenchError::CacheCleanup {
            path: PathBuf::from("/tmp/blast"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/blast"));
        assert!(err.to_string().contains("denied"));
    }
}
