//! Error types for the SitePilot protocol layer.

mod agent;
mod provider;
mod session;

pub use agent::*;
pub use provider::*;
pub use session::*;
