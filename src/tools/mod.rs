//! Tools module - browser tools for the research agent
//!
//! Contains browser automation and the registry of tool definitions the
//! agent advertises to the LLM.

pub mod browser;
pub mod registry;

pub use registry::ToolRegistry;
