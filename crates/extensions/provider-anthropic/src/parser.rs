//! Response parsing utilities.

use sitepilot_protocols::error::ProviderError;
use sitepilot_protocols::provider::{ChunkType, CompletionChunk, CompletionResponse};
use sitepilot_protocols::types::{self, Message, MessageRole, StopReason, ToolResultContent, Usage};

use crate::api::{ApiResponse, ContentBlock, ImageSource, StreamDelta, StreamEvent, ToolResultBlock};

/// Parse API response to CompletionResponse.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let content = response.content.into_iter().filter_map(parse_block).collect();

    CompletionResponse {
        id: response.id,
        model: response.model,
        message: Message {
            role: MessageRole::Assistant,
            content,
        },
        stop_reason: response
            .stop_reason
            .as_deref()
            .map(StopReason::parse)
            .unwrap_or(StopReason::EndTurn),
        usage: Usage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        },
    }
}

fn parse_block(block: ContentBlock) -> Option<types::ContentBlock> {
    match block {
        ContentBlock::Text { text } => Some(types::ContentBlock::Text { text }),
        ContentBlock::Image { source } => Some(types::ContentBlock::Image {
            source: parse_image(source),
        }),
        ContentBlock::ToolUse { id, name, input } => {
            Some(types::ContentBlock::ToolUse { id, name, input })
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => Some(types::ContentBlock::ToolResult {
            tool_use_id,
            content: content
                .into_iter()
                .map(|c| match c {
                    ToolResultBlock::Text { text } => ToolResultContent::Text { text },
                    ToolResultBlock::Image { source } => ToolResultContent::Image {
                        source: parse_image(source),
                    },
                })
                .collect(),
            is_error,
        }),
        ContentBlock::Unsupported => None,
    }
}

fn parse_image(source: ImageSource) -> types::ImageSource {
    match source {
        ImageSource::Base64 { media_type, data } => types::ImageSource::Base64 { media_type, data },
    }
}

/// Parse streaming event to CompletionChunk.
pub fn parse_stream_event(event: StreamEvent) -> Result<CompletionChunk, ProviderError> {
    let chunk = match event {
        StreamEvent::MessageStart { .. } => CompletionChunk::new(ChunkType::MessageStart),
        StreamEvent::ContentBlockDelta { delta, .. } => match delta {
            StreamDelta::TextDelta { text } => CompletionChunk::text(text),
            StreamDelta::InputJsonDelta { .. } => CompletionChunk::new(ChunkType::ToolUseDelta),
        },
        StreamEvent::MessageDelta { delta } => CompletionChunk {
            chunk_type: ChunkType::Other,
            delta: None,
            stop_reason: delta.stop_reason.as_deref().map(StopReason::parse),
        },
        StreamEvent::MessageStop => CompletionChunk::new(ChunkType::MessageEnd),
        StreamEvent::Error { error } => {
            return Err(ProviderError::StreamError(format!(
                "{}: {}",
                error.error_type, error.message
            )));
        }
        StreamEvent::ContentBlockStart { .. }
        | StreamEvent::ContentBlockStop { .. }
        | StreamEvent::Ping => {
            CompletionChunk::new(ChunkType::Other)
        }
    };
    Ok(chunk)
}

/// Incremental decoder for the server-sent event body. Network chunks may
/// split an event line anywhere, so partial lines are buffered until their
/// newline arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
}

impl SseDecoder {
    /// Feed raw bytes and return the chunks of every complete `data:` line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<CompletionChunk, ProviderError>> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut chunks = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();
            if data == "[DONE]" {
                chunks.push(Ok(CompletionChunk::new(ChunkType::MessageEnd)));
                continue;
            }
            match serde_json::from_str::<StreamEvent>(data) {
                Ok(event) => chunks.push(parse_stream_event(event)),
                Err(e) => tracing::debug!("Skipping unparsable stream event: {}", e),
            }
        }
        chunks
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
