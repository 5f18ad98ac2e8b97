//! Agent adapter trait and factory
//!
//! An adapter is the uniform way to hand a research task to a backend and
//! get a final answer back. It is also the boundary where backend errors
//! become a failed [`Outcome`].

use async_trait::async_trait;
use tracing::debug;

use crate::bench::browser::BrowserAgentAdapter;
use crate::bench::service::HttpServiceAdapter;
use crate::core::{BackendKind, Config, Outcome, ResearchTask, Result};

/// Uniform invocation interface over research-agent backends
#[async_trait]
pub trait AgentAdapter: Send + Sync {
    /// Which backend this adapter drives
    fn kind(&self) -> BackendKind;

    /// Run the task to completion and return the backend's final answer.
    ///
    /// Any resource acquired for the call is released before this returns,
    /// whether it succeeds or fails.
    async fn invoke(&self, task: &ResearchTask) -> Result<String>;

    /// Run the task and normalize the result into an [`Outcome`]
    async fn run(&self, task: &ResearchTask) -> Outcome {
        match self.invoke(task).await {
            Ok(text) => Outcome::success(text),
            Err(e) => Outcome::failure(e.to_string()),
        }
    }
}

/// Build the adapter for a backend from configuration
///
/// Model, endpoint, headless and vision settings come from the backend's
/// [`AgentConfig`](crate::core::AgentConfig); the rest is read from `config`.
pub fn create_adapter(kind: BackendKind, config: &Config) -> Result<Box<dyn AgentAdapter>> {
    let agent_config = config.agent_config(kind);
    debug!(backend = %kind, model = agent_config.model_name(), config = ?agent_config, "building adapter");

    let adapter: Box<dyn AgentAdapter> = match agent_config.kind() {
        BackendKind::HttpAgentService => {
            Box::new(HttpServiceAdapter::from_config(&agent_config, config)?)
        }
        BackendKind::InProcessBrowserAgent => {
            Box::new(BrowserAgentAdapter::from_config(&agent_config, config)?)
        }
    };
    Ok(adapter)
}
