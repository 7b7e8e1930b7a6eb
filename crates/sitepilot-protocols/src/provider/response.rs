//! Completion response types.

use serde::{Deserialize, Serialize};

use crate::types::{Message, StopReason, Usage};

/// Response from a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    /// The assistant's message, including any tool use blocks.
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl CompletionResponse {
    /// Whether the model asked for at least one tool call.
    pub fn has_tool_use(&self) -> bool {
        self.message.tool_uses().next().is_some()
    }
}

/// A chunk in a streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChunk {
    pub chunk_type: ChunkType,

    /// Text delta for `ContentDelta` chunks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl CompletionChunk {
    pub fn new(chunk_type: ChunkType) -> Self {
        Self {
            chunk_type,
            delta: None,
            stop_reason: None,
        }
    }

    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            chunk_type: ChunkType::ContentDelta,
            delta: Some(delta.into()),
            stop_reason: None,
        }
    }
}

/// Type of streaming chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    MessageStart,
    ContentDelta,
    ToolUseDelta,
    MessageEnd,
    /// Keep-alive or an event the consumer can ignore.
    Other,
}
