//! Researchbench - Research Agent Comparison Harness
//!
//! Sends one research question to several agent backends, times each run,
//! and prints a side-by-side comparison of answers and elapsed times.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Bench**: Backend adapters, the timed task runner, and the report
//! - **Agent**: The in-process browser research agent
//! - **LLM**: LLM provider abstraction with an OpenAI-compatible client
//! - **Tools**: Browser session wrapper and the agent's tool registry
//!
//! # Usage
//!
//! ```rust,no_run
//! use researchbench::{create_adapter, ComparisonReport, Config, TaskRunner};
//!
//! #[tokio::main]
//! async fn main() -> researchbench::Result<()> {
//!     let config = Config::load()?;
//!     let task = config.research_task();
//!     let runner = TaskRunner::from_config(&config.bench);
//!
//!     let mut report = ComparisonReport::new();
//!     for kind in &config.bench.backends {
//!         let adapter = create_adapter(*kind, &config)?;
//!         report.add(runner.run(adapter.as_ref(), &task).await);
//!     }
//!     println!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod bench;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use bench::{create_adapter, AgentAdapter, ComparisonReport, TaskRunner};
pub use core::{BackendKind, BenchError, Config, Outcome, ResearchTask, Result, RunResult};
