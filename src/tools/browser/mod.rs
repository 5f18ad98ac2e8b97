//! Browser automation module
//!
//! Wraps agent-browser CLI for web automation behind a session trait.

mod executor;
mod session;
mod snapshot;

pub use executor::{AgentBrowserLauncher, AgentBrowserSession};
pub use session::{BrowserAction, BrowserLauncher, BrowserOptions, BrowserSession};
pub use snapshot::{Element, PageSnapshot};
