//! Bench module - timed comparison of research-agent backends
//!
//! Adapters wrap each backend behind one interface, the runner times a
//! single invocation, and the report collects the results.

pub mod adapter;
pub mod browser;
pub mod report;
pub mod runner;
pub mod service;

pub use adapter::{create_adapter, AgentAdapter};
pub use browser::BrowserAgentAdapter;
pub use report::ComparisonReport;
pub use runner::TaskRunner;
pub use service::{clear_cache_dir, HttpServiceAdapter, ResponseShape, DEFAULT_SERVICE_URL};
