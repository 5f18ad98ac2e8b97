//! Browser session abstraction
//!
//! A session is one browser instance owned by a single agent run. Launchers
//! create sessions; whoever launches one is responsible for closing it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::core::{Result, ToolResult};

/// A single operation the research agent can perform on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    /// Navigate to a URL and return the page snapshot
    Open { url: String },
    /// Capture the interactive elements of the current page
    Snapshot,
    /// Click an element by snapshot ref
    Click { ref_id: String },
    /// Type text into an element by snapshot ref
    Fill { ref_id: String, text: String },
    /// Read the text content of an element
    GetText { ref_id: String },
    /// Scroll the page
    Scroll {
        direction: String,
        pixels: Option<u32>,
    },
    /// Press a key (e.g. Enter)
    Press { key: String },
    /// Capture a base64 PNG of the viewport
    Screenshot,
}

impl BrowserAction {
    /// Tool name reported in observations
    pub fn tool_name(&self) -> &'static str {
        match self {
            BrowserAction::Open { .. } => "browser_url",
            BrowserAction::Snapshot => "browser_snapshot",
            BrowserAction::Click { .. } => "browser_click",
            BrowserAction::Fill { .. } => "browser_fill",
            BrowserAction::GetText { .. } => "browser_get_text",
            BrowserAction::Scroll { .. } => "browser_scroll",
            BrowserAction::Press { .. } => "browser_press",
            BrowserAction::Screenshot => "browser_screenshot",
        }
    }
}

impl fmt::Display for BrowserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserAction::Open { url } => write!(f, "open {}", url),
            BrowserAction::Snapshot => write!(f, "snapshot"),
            BrowserAction::Click { ref_id } => write!(f, "click {}", ref_id),
            BrowserAction::Fill { ref_id, .. } => write!(f, "fill {}", ref_id),
            BrowserAction::GetText { ref_id } => write!(f, "get text {}", ref_id),
            BrowserAction::Scroll { direction, .. } => write!(f, "scroll {}", direction),
            BrowserAction::Press { key } => write!(f, "press {}", key),
            BrowserAction::Screenshot => write!(f, "screenshot"),
        }
    }
}

/// Options applied when a browser is launched
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
}

/// A live browser owned by one agent run
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Session identifier
    fn name(&self) -> &str;

    /// Perform an action on the current page
    async fn execute(&self, action: &BrowserAction) -> Result<ToolResult>;

    /// Shut the browser down
    async fn close(&self) -> Result<()>;
}

/// Creates browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Start a fresh session; never hands out a session twice
    async fn launch(&self, options: BrowserOptions) -> Result<Arc<dyn BrowserSession>>;
}
