//! Page snapshots from agent-browser
//!
//! `snapshot -i --json` returns the interactive accessibility tree plus a
//! map of element refs. The agent reads the tree when present and a ref
//! listing otherwise.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<WireData>,
}

#[derive(Deserialize)]
struct WireData {
    #[serde(default)]
    snapshot: String,
    #[serde(default)]
    refs: BTreeMap<String, Element>,
}

/// An addressable element on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub role: String,
    /// Accessible name
    #[serde(default)]
    pub name: String,
    /// Current value of inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Interactive view of the current page
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageSnapshot {
    /// Accessibility tree text, empty when the CLI sent only refs
    pub tree: String,
    /// Elements keyed by ref id (`e1`, `e2`, ...)
    pub refs: BTreeMap<String, Element>,
}

impl PageSnapshot {
    /// Parse `--json` output; `None` if it is not a successful snapshot
    pub fn from_json(output: &str) -> Option<Self> {
        let wire: WireSnapshot = serde_json::from_str(output).ok()?;
        if !wire.success {
            return None;
        }
        let data = wire.data?;
        Some(Self {
            tree: data.snapshot,
            refs: data.refs,
        })
    }

    pub fn element_count(&self) -> usize {
        self.refs.len()
    }

    /// Element counts per role, e.g. `3 link, 1 textbox`
    pub fn role_summary(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for element in self.refs.values() {
            *counts.entry(element.role.as_str()).or_default() += 1;
        }
        counts
            .iter()
            .map(|(role, n)| format!("{} {}", n, role))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Text handed to the model as the observation body
    pub fn format_for_agent(&self) -> String {
        if !self.tree.trim().is_empty() {
            return self.tree.clone();
        }
        if self.refs.is_empty() {
            return "No interactive elements on this page".to_string();
        }

        let mut output = String::new();
        for (ref_id, element) in &self.refs {
            output.push_str(&format!(
                "- {} \"{}\" [ref={}]",
                element.role, element.name, ref_id
            ));
            if let Some(ref value) = element.value {
                output.push_str(&format!(" value=\"{}\"", value));
            }
            output.push('\n');
        }
        output
    }
}
