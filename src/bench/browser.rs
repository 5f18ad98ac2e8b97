//! In-process browser agent adapter
//!
//! Launches a fresh browser session per invocation, lets the research agent
//! work inside it, and always closes it again.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::agent::{BrowserResearchAgent, ResearchAgent};
use crate::bench::adapter::AgentAdapter;
use crate::core::{AgentConfig, BackendKind, BenchError, Config, ResearchTask, Result};
use crate::llm::OpenAiClient;
use crate::tools::browser::{
    AgentBrowserLauncher, BrowserLauncher, BrowserOptions, BrowserSession,
};

/// Adapter for the in-process browser agent backend
pub struct BrowserAgentAdapter {
    launcher: Arc<dyn BrowserLauncher>,
    agent: Arc<dyn ResearchAgent>,
    options: BrowserOptions,
}

impl BrowserAgentAdapter {
    /// Create an adapter from explicit parts
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        agent: Arc<dyn ResearchAgent>,
        options: BrowserOptions,
    ) -> Self {
        Self {
            launcher,
            agent,
            options,
        }
    }

    /// Create an adapter backed by agent-browser and an OpenAI-compatible model
    ///
    /// Model, headless and vision come from `agent`; the LLM endpoint and
    /// step budget from the `[browser_agent]` section of `config`.
    pub fn from_config(agent: &AgentConfig, config: &Config) -> Result<Self> {
        let AgentConfig::BrowserAgent {
            headless,
            use_vision,
            model_name,
        } = agent
        else {
            return Err(BenchError::config(format!(
                "{} settings cannot build the browser agent adapter",
                agent.kind()
            )));
        };

        let llm = OpenAiClient::from_config(&config.browser_agent)?;
        let research_agent = BrowserResearchAgent::new(
            Arc::new(llm),
            model_name.clone(),
            *use_vision,
            config.browser_agent.max_steps,
        );

        Ok(Self::new(
            Arc::new(AgentBrowserLauncher::default()),
            Arc::new(research_agent),
            BrowserOptions {
                headless: *headless,
            },
        ))
    }
}

#[async_trait]
impl AgentAdapter for BrowserAgentAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::InProcessBrowserAgent
    }

    async fn invoke(&self, task: &ResearchTask) -> Result<String> {
        let session = self.launcher.launch(self.options).await?;
        let guard = SessionGuard::new(Arc::clone(&session));

        let run = self.agent.run(task, session.as_ref()).await;
        let released = guard.release().await;

        match (run, released) {
            (Ok(history), Ok(())) => history
                .final_result()
                .map(str::to_string)
                .ok_or_else(|| BenchError::agent("agent finished without a final result")),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(run_err), Ok(())) => Err(run_err),
            (Err(run_err), Err(close_err)) => Err(BenchError::agent(format!(
                "{} (browser close also failed: {})",
                run_err, close_err
            ))),
        }
    }
}

/// Owns a session until it is released.
///
/// `release` closes it on the normal path; if the invocation is cancelled or
/// panics first, `Drop` hands the close to the runtime instead.
struct SessionGuard {
    session: Option<Arc<dyn BrowserSession>>,
}

impl SessionGuard {
    fn new(session: Arc<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    async fn release(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                debug!(session = session.name(), "releasing browser session");
                session.close().await
            }
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        warn!(
            session = session.name(),
            "run ended before the browser was released; closing in background"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!(session = session.name(), error = %e, "background browser close failed");
                    }
                });
            }
            Err(_) => warn!(
                session = session.name(),
                "no async runtime available; browser session left open"
            ),
        }
    }
}
