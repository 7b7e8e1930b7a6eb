//! Message and tool conversion utilities.

use sitepilot_protocols::provider::{CompletionRequest, ToolSpec};
use sitepilot_protocols::types::{self, Message, MessageRole, ToolResultContent};

use crate::api::{
    ApiContent, ApiMessage, ApiTool, COMPUTER_TOOL_TYPE, ContentBlock, ImageSource, ToolResultBlock,
};

/// Convert messages to Anthropic API format.
pub fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
    messages
        .iter()
        .map(|m| ApiMessage {
            role: match m.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
            },
            content: convert_content(m),
        })
        .collect()
}

/// Convert a single message's content. A lone text block is sent as a plain
/// string.
pub fn convert_content(message: &Message) -> ApiContent {
    if let [types::ContentBlock::Text { text }] = message.content.as_slice() {
        return ApiContent::Text(text.clone());
    }
    ApiContent::Blocks(message.content.iter().map(convert_block).collect())
}

fn convert_block(block: &types::ContentBlock) -> ContentBlock {
    match block {
        types::ContentBlock::Text { text } => ContentBlock::Text { text: text.clone() },
        types::ContentBlock::Image { source } => ContentBlock::Image {
            source: convert_image(source),
        },
        types::ContentBlock::ToolUse { id, name, input } => ContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        types::ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ContentBlock::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: content
                .iter()
                .map(|c| match c {
                    ToolResultContent::Text { text } => {
                        ToolResultBlock::Text { text: text.clone() }
                    }
                    ToolResultContent::Image { source } => ToolResultBlock::Image {
                        source: convert_image(source),
                    },
                })
                .collect(),
            is_error: *is_error,
        },
    }
}

fn convert_image(source: &types::ImageSource) -> ImageSource {
    match source {
        types::ImageSource::Base64 { media_type, data } => ImageSource::Base64 {
            media_type: media_type.clone(),
            data: data.clone(),
        },
    }
}

/// Convert tools to Anthropic API format.
pub fn convert_tools(request: &CompletionRequest) -> Vec<ApiTool> {
    request
        .tools
        .iter()
        .map(|t| match t {
            ToolSpec::Computer {
                display_width_px,
                display_height_px,
            } => ApiTool::Computer {
                tool_type: COMPUTER_TOOL_TYPE,
                name: "computer",
                display_width_px: *display_width_px,
                display_height_px: *display_height_px,
            },
            ToolSpec::Function {
                name,
                description,
                input_schema,
            } => ApiTool::Function {
                name: name.clone(),
                description: description.clone(),
                input_schema: input_schema.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
#[path = "converter_tests.rs"]
mod tests;
