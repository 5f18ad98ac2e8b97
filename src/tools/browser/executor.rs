//! Browser executor - wraps agent-browser CLI
//!
//! Each session maps to one named agent-browser session, so concurrent or
//! consecutive runs never share a browser.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use crate::core::{BenchError, Result, ToolResult};
use crate::tools::browser::session::{
    BrowserAction, BrowserLauncher, BrowserOptions, BrowserSession,
};
use crate::tools::browser::snapshot::PageSnapshot;

/// Browser session driven through the agent-browser CLI
pub struct AgentBrowserSession {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
}

impl AgentBrowserSession {
    /// Create a new session handle
    pub fn new(session_name: impl Into<String>, headed: bool) -> Self {
        Self {
            session_name: session_name.into(),
            headed,
        }
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Build the argument list for an agent-browser invocation
    fn command_args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = vec!["--session", self.session_name.as_str()];
        if self.headed {
            full.push("--headed");
        }
        full.extend_from_slice(args);
        full
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let full_args = self.command_args(args);
        debug!(session = %self.session_name, args = ?args, "agent-browser");

        let output = Command::new("agent-browser")
            .args(&full_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BenchError::AgentBrowserNotFound
                } else {
                    BenchError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BenchError::browser(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }

    /// Interactive snapshot of the current page, formatted for the agent
    async fn snapshot(&self, tool_name: &str, heading: String) -> Result<ToolResult> {
        let output = self.run_command(&["snapshot", "-i", "--json"]).await?;

        match PageSnapshot::from_json(&output) {
            Some(snapshot) => Ok(ToolResult::success_with_data(
                tool_name,
                format!(
                    "{} ({} elements: {}):\n{}",
                    heading,
                    snapshot.element_count(),
                    snapshot.role_summary(),
                    snapshot.format_for_agent()
                ),
                serde_json::to_value(&snapshot).unwrap_or(serde_json::Value::Null),
            )),
            None => Ok(ToolResult::success(
                tool_name,
                format!("{}:\n{}", heading, output),
            )),
        }
    }
}

/// agent-browser expects refs with an `@` prefix; models often drop it
fn normalize_ref(ref_id: &str) -> String {
    let trimmed = ref_id.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{}", trimmed)
    }
}

#[async_trait]
impl BrowserSession for AgentBrowserSession {
    fn name(&self) -> &str {
        &self.session_name
    }

    async fn execute(&self, action: &BrowserAction) -> Result<ToolResult> {
        let tool = action.tool_name();

        match action {
            BrowserAction::Open { url } => {
                self.run_command(&["open", url.as_str()]).await?;
                // Best effort: some pages never go network-idle
                let _ = self.run_command(&["wait", "--load", "networkidle"]).await;
                self.snapshot(tool, format!("Navigated to {}. Page snapshot", url))
                    .await
            }
            BrowserAction::Snapshot => self.snapshot(tool, "Page snapshot".to_string()).await,
            BrowserAction::Click { ref_id } => {
                let ref_id = normalize_ref(ref_id);
                self.run_command(&["click", ref_id.as_str()]).await?;
                self.snapshot(tool, format!("Clicked {}. Updated page", ref_id))
                    .await
            }
            BrowserAction::Fill { ref_id, text } => {
                let ref_id = normalize_ref(ref_id);
                self.run_command(&["fill", ref_id.as_str(), text.as_str()]).await?;
                Ok(ToolResult::success(
                    tool,
                    format!("Filled {} with '{}'", ref_id, text),
                ))
            }
            BrowserAction::GetText { ref_id } => {
                let ref_id = normalize_ref(ref_id);
                let output = self.run_command(&["get", "text", ref_id.as_str()]).await?;
                Ok(ToolResult::success(tool, output.trim()))
            }
            BrowserAction::Scroll { direction, pixels } => {
                let px_str = pixels.map(|px| px.to_string());
                let mut args = vec!["scroll", direction.as_str()];
                if let Some(ref px) = px_str {
                    args.push(px.as_str());
                }
                self.run_command(&args).await?;
                self.snapshot(tool, format!("Scrolled {}. Updated page", direction))
                    .await
            }
            BrowserAction::Press { key } => {
                self.run_command(&["press", key.as_str()]).await?;
                Ok(ToolResult::success(tool, format!("Pressed {}", key)))
            }
            BrowserAction::Screenshot => {
                let output = self.run_command(&["screenshot"]).await?;
                let encoded = output.trim().to_string();
                Ok(ToolResult::success_with_data(
                    tool,
                    format!("Screenshot captured ({} bytes base64)", encoded.len()),
                    serde_json::Value::String(encoded),
                ))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        debug!(session = %self.session_name, "browser closed");
        Ok(())
    }
}

/// Launches agent-browser sessions with unique names
#[derive(Debug, Clone, Default)]
pub struct AgentBrowserLauncher {
    prefix: Option<String>,
}

impl AgentBrowserLauncher {
    /// Create a launcher whose session names start with `prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn session_name(&self) -> String {
        format!(
            "{}-{:08x}",
            self.prefix.as_deref().unwrap_or("researchbench"),
            rand::random::<u32>()
        )
    }
}

#[async_trait]
impl BrowserLauncher for AgentBrowserLauncher {
    async fn launch(&self, options: BrowserOptions) -> Result<Arc<dyn BrowserSession>> {
        if !AgentBrowserSession::is_available().await {
            return Err(BenchError::AgentBrowserNotFound);
        }

        let session = AgentBrowserSession::new(self.session_name(), !options.headless);
        debug!(session = %session.session_name, headless = options.headless, "browser session created");
        Ok(Arc::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = AgentBrowserSession::new("test-session", true);
        assert_eq!(session.name(), "test-session");
        assert!(session.headed);
    }

    #[test]
    fn test_command_args_include_session_and_headed() {
        let headed = AgentBrowserSession::new("s1", true);
        assert_eq!(
            headed.command_args(&["open", "https://example.com"]),
            vec!["--session", "s1", "--headed", "open", "https://example.com"]
        );

        let headless = AgentBrowserSession::new("s2", false);
        assert_eq!(
            headless.command_args(&["close"]),
            vec!["--session", "s2", "close"]
        );
    }

    #[test]
    fn test_normalize_ref() {
        assert_eq!(normalize_ref("e5"), "@e5");
        assert_eq!(normalize_ref("@e5"), "@e5");
        assert_eq!(normalize_ref(" e7 "), "@e7");
    }

    #[test]
    fn test_launcher_session_names_are_unique() {
        let launcher = AgentBrowserLauncher::with_prefix("bench");
        let first = launcher.session_name();
        let second = launcher.session_name();
        assert!(first.starts_with("bench-"));
        assert_ne!(first, second);
    }
}
