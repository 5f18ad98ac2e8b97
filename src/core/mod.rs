//! Core module - shared infrastructure for researchbench
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the harness.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{BenchError, Result};
pub use types::*;
