//! # SitePilot Protocols
//!
//! Interface definitions shared by the SitePilot crates. Contains no
//! platform or network code.
//!
//! - [`LLMProvider`] - trait implemented by model backends
//! - [`Message`] / [`ContentBlock`] - tool-use conversation types
//! - error enums for the provider, session and agent layers

pub mod error;
pub mod provider;
pub mod types;

pub use error::{AgentError, ProviderError, SessionError};
pub use provider::{
    ChunkType, CompletionChunk, CompletionRequest, CompletionResponse, CompletionStream,
    LLMProvider, ToolSpec,
};
pub use types::*;
