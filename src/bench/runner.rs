//! Task runner
//!
//! Times exactly one adapter invocation and turns whatever happened into a
//! [`RunResult`]. Nothing escapes this boundary: errors, timeouts and panics
//! all become failed outcomes.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::bench::adapter::AgentAdapter;
use crate::core::config::BenchConfig;
use crate::core::{BenchError, Outcome, ResearchTask, RunResult};

/// Runs a task against one adapter at a time
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    /// Upper bound for a single run; unbounded when `None`
    timeout: Option<Duration>,
}

impl TaskRunner {
    /// Create a runner without a time limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that gives up on a run after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Create a runner from configuration
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Invoke the adapter once and time it
    pub async fn run(&self, adapter: &dyn AgentAdapter, task: &ResearchTask) -> RunResult {
        let kind = adapter.kind();
        info!(backend = %kind, "run started");

        let invocation = AssertUnwindSafe(adapter.run(task)).catch_unwind();

        let start = Instant::now();
        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(caught) => caught,
                Err(_) => Ok(Outcome::failure(BenchError::Timeout(limit).to_string())),
            },
            None => invocation.await,
        };
        let elapsed = start.elapsed();

        let outcome = caught.unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(backend = %kind, "adapter panicked: {}", message);
            Outcome::failure(format!("adapter panicked: {}", message))
        });

        info!(
            backend = %kind,
            elapsed_secs = elapsed.as_secs_f64(),
            success = outcome.is_success(),
            "run finished"
        );

        RunResult::new(kind, elapsed.as_secs_f64(), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BackendKind, Result};
    use async_trait::async_trait;

    struct SleepyAdapter {
        delay: Duration,
    }

    #[async_trait]
    impl AgentAdapter for SleepyAdapter {
        fn kind(&self) -> BackendKind {
            BackendKind::InProcessBrowserAgent
        }

        async fn invoke(&self, _task: &ResearchTask) -> Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok("done".to_string())
        }
    }

    struct PanickingAdapter;

    #[async_trait]
    impl AgentAdapter for PanickingAdapter {
        fn kind(&self) -> BackendKind {
            BackendKind::HttpAgentService
        }

        async fn invoke(&self, _task: &ResearchTask) -> Result<String> {
            panic!("backend exploded");
        }
    }

    #[tokio::test]
    async fn test_elapsed_includes_adapter_delay() {
        let adapter = SleepyAdapter {
            delay: Duration::from_millis(50),
        };
        let result = TaskRunner::new()
            .run(&adapter, &ResearchTask::new("q"))
            .await;

        assert!(result.is_success());
        assert!(result.elapsed_seconds() >= 0.05);
        assert_eq!(result.backend_kind(), BackendKind::InProcessBrowserAgent);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure() {
        let adapter = SleepyAdapter {
            delay: Duration::from_secs(30),
        };
        let result = TaskRunner::with_timeout(Duration::from_millis(20))
            .run(&adapter, &ResearchTask::new("q"))
            .await;

        assert_eq!(result.outcome(), &Outcome::failure("timed out after 20ms"));
        assert!(result.elapsed_seconds() >= 0.02);
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let result = TaskRunner::new()
            .run(&PanickingAdapter, &ResearchTask::new("q"))
            .await;

        assert_eq!(
            result.outcome(),
            &Outcome::failure("adapter panicked: backend exploded")
        );
    }

    #[test]
    fn test_from_config() {
        let config = BenchConfig {
            backends: vec![BackendKind::HttpAgentService],
            timeout_secs: Some(600),
        };
        let runner = TaskRunner::from_config(&config);
        assert_eq!(runner.timeout, Some(Duration::from_secs(600)));
    }
}
