//! Tool registry - browser tool definitions and call decoding
//!
//! Advertises the browser tools to the LLM and turns the model's tool calls
//! back into [`BrowserAction`]s. There is no close tool; the harness owns
//! the session.

use crate::core::{BenchError, Result, ToolCall, ToolDefinition};
use crate::tools::browser::BrowserAction;

/// Registry of tools the research agent may call
pub struct ToolRegistry {
    /// Tool definitions in advertisement order
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Create a registry with the browser tools; screenshots only with vision
    pub fn new(use_vision: bool) -> Self {
        let mut registry = Self {
            definitions: Vec::new(),
        };
        registry.register_browser_tools();
        if use_vision {
            registry.register(ToolDefinition::function(
                "browser_screenshot",
                "Take a screenshot of the current page; it is attached to your next observation",
                serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
            ));
        }
        registry
    }

    /// Register browser automation tools
    fn register_browser_tools(&mut self) {
        let ref_only = serde_json::json!({
            "type": "object",
            "properties": {
                "ref": {
                    "type": "string",
                    "description": "Element ref from snapshot (e.g., e1, @e2)"
                }
            },
            "required": ["ref"]
        });

        self.register(ToolDefinition::function(
            "browser_url",
            "Navigate to a URL and get the page structure for analysis",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to navigate to"
                    }
                },
                "required": ["url"]
            }),
        ));

        self.register(ToolDefinition::function(
            "browser_snapshot",
            "Get current page accessibility tree with interactive element refs",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ));

        self.register(ToolDefinition::function(
            "browser_click",
            "Click an element on the page by its ref from snapshot",
            ref_only.clone(),
        ));

        self.register(ToolDefinition::function(
            "browser_fill",
            "Fill text into an input field by its ref",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ref": {
                        "type": "string",
                        "description": "Element ref from snapshot"
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to enter"
                    }
                },
                "required": ["ref", "text"]
            }),
        ));

        self.register(ToolDefinition::function(
            "browser_get_text",
            "Get text content from an element",
            ref_only,
        ));

        self.register(ToolDefinition::function(
            "browser_scroll",
            "Scroll the page to reveal more content",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "enum": ["up", "down"],
                        "description": "Scroll direction"
                    },
                    "pixels": {
                        "type": "integer",
                        "description": "Distance in pixels (optional)"
                    }
                },
                "required": ["direction"]
            }),
        ));

        self.register(ToolDefinition::function(
            "browser_press",
            "Press a keyboard key such as Enter or Tab",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "Key name"
                    }
                },
                "required": ["key"]
            }),
        ));
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition) {
        self.definitions.push(definition);
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Check whether a tool is advertised
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.function.name == name)
    }

    /// Decode a tool call into a browser action
    pub fn to_action(&self, tool_call: &ToolCall) -> Result<BrowserAction> {
        if !self.contains(&tool_call.name) {
            return Err(BenchError::browser(format!(
                "Unknown tool: {}",
                tool_call.name
            )));
        }

        let required = |key: &str| {
            tool_call.get_string(key).ok_or_else(|| {
                BenchError::browser(format!(
                    "{} requires a '{}' argument",
                    tool_call.name, key
                ))
            })
        };

        let action = match tool_call.name.as_str() {
            "browser_url" => BrowserAction::Open {
                url: required("url")?,
            },
            "browser_snapshot" => BrowserAction::Snapshot,
            "browser_click" => BrowserAction::Click {
                ref_id: required("ref")?,
            },
            "browser_fill" => BrowserAction::Fill {
                ref_id: required("ref")?,
                text: required("text")?,
            },
            "browser_get_text" => BrowserAction::GetText {
                ref_id: required("ref")?,
            },
            "browser_scroll" => BrowserAction::Scroll {
                direction: required("direction")?,
                pixels: tool_call.get_u32("pixels"),
            },
            "browser_press" => BrowserAction::Press {
                key: required("key")?,
            },
            "browser_screenshot" => BrowserAction::Screenshot,
            other => {
                return Err(BenchError::browser(format!("Unknown tool: {}", other)));
            }
        };

        Ok(action)
    }
}
