//! Agent module - the in-process browser research agent
//!
//! Contains the research loop and its run history.

pub mod loop_state;
pub mod research_agent;

pub use loop_state::{AgentHistory, AgentStep, Observation};
pub use research_agent::{BrowserResearchAgent, ResearchAgent};
