//! Agent run history
//!
//! Each step of the browser agent is recorded with the model's reasoning and
//! what the browser reported back, so later steps and the final synthesis
//! can replay it.

use serde::{Deserialize, Serialize};

use crate::core::ToolResult;

/// Longest single observation replayed to the model
const MAX_OBSERVATION_CHARS: usize = 6000;

/// History of one research agent run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentHistory {
    /// Step budget; the loop stops once this many steps are recorded
    pub max_steps: usize,
    pub steps: Vec<AgentStep>,
    pub final_answer: Option<String>,
}

/// One act-and-observe cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentStep {
    /// Text the model emitted alongside its tool calls, possibly empty
    pub thought: String,
    pub observations: Vec<Observation>,
}

impl AgentHistory {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Self::default()
        }
    }

    /// History of a run that answered without touching the browser
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            final_answer: Some(answer.into()),
            ..Self::default()
        }
    }

    pub fn steps_taken(&self) -> usize {
        self.steps.len()
    }

    /// Whether another step may run
    pub fn should_continue(&self) -> bool {
        self.final_answer.is_none() && self.steps.len() < self.max_steps
    }

    /// The agent's final natural-language answer, if it produced one
    pub fn final_result(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    /// Record a finished step
    pub fn record_step(&mut self, thought: impl Into<String>, observations: Vec<Observation>) {
        self.steps.push(AgentStep {
            thought: thought.into(),
            observations,
        });
    }

    /// Every observation across all steps, oldest first
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.steps.iter().flat_map(|step| step.observations.iter())
    }

    /// Render past steps for the next prompt; empty before the first step
    pub fn format_observations(&self) -> String {
        if self.steps.is_empty() {
            return String::new();
        }

        let mut output = String::from("\n\n## Previous steps\n");
        for (i, step) in self.steps.iter().enumerate() {
            output.push_str(&format!("\n### Step {}\n", i + 1));
            if !step.thought.trim().is_empty() {
                output.push_str(&format!("Thought: {}\n", step.thought.trim()));
            }
            for obs in &step.observations {
                let status = if obs.success { "ok" } else { "FAILED" };
                output.push_str(&format!(
                    "[{} {}]\n{}\n",
                    obs.tool_name,
                    status,
                    clip(&obs.output, MAX_OBSERVATION_CHARS)
                ));
            }
        }
        output
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\n[truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

/// What one browser tool call produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub tool_name: String,
    pub success: bool,
    /// Page text on success, error message on failure
    pub output: String,
}

impl Observation {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    pub fn error(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }
}

impl From<ToolResult> for Observation {
    fn from(result: ToolResult) -> Self {
        Self {
            tool_name: result.tool_name,
            success: result.success,
            output: result.output,
        }
    }
}
