//! # SitePilot Runtime
//!
//! Session runtime: the single-session gate, the computer-use tool loop,
//! website navigation, endpoint scraping and documentation generation.

pub mod agent_loop;
pub mod docs;
pub mod endpoint_store;
pub mod gate;
pub mod navigator;
pub mod scraper;
pub mod session;
pub mod tool;

#[cfg(test)]
mod testing;

pub use agent_loop::{
    AgentLoopConfig, COMPUTER_TOOL_NAME, ComputerUseLoop, LoopOutcome, LoopStop, SYSTEM_PROMPT,
};
pub use docs::{DocsGenerator, DocsRequest};
pub use endpoint_store::{EndpointStore, StoreError, sanitize_slug};
pub use gate::{GatePermit, SessionGate};
pub use navigator::{ExtractionMethod, Resolution, WebsiteNavigator};
pub use scraper::{EndpointScraper, ScrapeReport};
pub use session::{NavigationStarted, ScrapeStarted, SessionManager, ToolFactory};
pub use tool::{ComputerTool, execute_blocking};
