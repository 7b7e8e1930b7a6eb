//! Conversation types shared between the runtime and model providers.

mod common;
mod message;

pub use common::*;
pub use message::*;
