//! Computer-use tool loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sitepilot_config::Config;
use sitepilot_desktop::{ActionOutput, ActionResult};
use sitepilot_protocols::provider::{CompletionRequest, LLMProvider, ToolSpec};
use sitepilot_protocols::types::{ContentBlock, Message, MessageRole, ToolResultContent};
use tracing::{debug, error, info, warn};

use crate::tool::{ComputerTool, execute_blocking};

/// Name of the provider-defined computer tool.
pub const COMPUTER_TOOL_NAME: &str = "computer";

/// Standing instructions for every computer-use session.
pub const SYSTEM_PROMPT: &str = "\
You are controlling a macOS machine through the computer tool. Available actions: \
screenshot, left_click, double_click, triple_click, right_click, middle_click, left_click_drag, \
left_mouse_down, left_mouse_up, mouse_move, type, key, hold_key, scroll, wait, capture_html.

Guidelines:
- Take a screenshot first to see the current state of the screen.
- After an action that should change the display, take another screenshot to check the result.
- Keyboard shortcuts use macOS names: 'command+space' opens Spotlight, 'return' is Enter.
- For the key action put the exact combination in the 'key' field, e.g. {\"action\": \"key\", \"key\": \"command+space\"}.
- command+space waits until Spotlight is ready before returning, so take a screenshot right after it without an extra wait.
- If Spotlight is already open with old text, select it with command+a before typing.
- For the wait action pass 'seconds', e.g. {\"action\": \"wait\", \"seconds\": 2}.
- capture_html selects the whole page and returns its contents from the clipboard.
- If an action does not work as expected, take a screenshot and try another approach.";

/// Settings for [`ComputerUseLoop`].
#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    pub model: String,
    pub max_tokens: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub between_iterations: Duration,
}

impl AgentLoopConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.provider.agent_model.clone(),
            max_tokens: config.provider.max_tokens,
            display_width: config.display.width,
            display_height: config.display.height,
            between_iterations: config.session.between_iterations(),
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStop {
    /// The model answered without asking for a tool.
    Completed,
    MaxIterations,
    /// The fail-safe corner was hit.
    FailSafe,
    /// The model call failed; the transcript so far is kept.
    ProviderError,
}

/// Transcript and verdict of one loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub messages: Vec<Message>,
    pub iterations: u32,
    pub stop: LoopStop,
    pub error: Option<String>,
}

impl LoopOutcome {
    /// Text of every tool result in the transcript, oldest first.
    pub fn tool_result_texts(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .flat_map(|m| m.content.iter())
            .filter_map(|block| match block {
                ContentBlock::ToolResult { content, .. } => Some(content),
                _ => None,
            })
            .flatten()
            .filter_map(|c| match c {
                ToolResultContent::Text { text } => Some(text.as_str()),
                ToolResultContent::Image { .. } => None,
            })
    }
}

/// Drives the model and the computer tool in alternation.
pub struct ComputerUseLoop {
    provider: Arc<dyn LLMProvider>,
    config: AgentLoopConfig,
}

impl ComputerUseLoop {
    pub fn new(provider: Arc<dyn LLMProvider>, config: AgentLoopConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AgentLoopConfig {
        &self.config
    }

    fn request(&self, messages: &[Message]) -> CompletionRequest {
        CompletionRequest::new(self.config.model.clone(), messages.to_vec())
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(self.config.max_tokens)
            .with_tool(ToolSpec::Computer {
                display_width_px: self.config.display_width,
                display_height_px: self.config.display_height,
            })
    }

    /// Run the loop for `task` until the model stops asking for tools, the
    /// fail-safe trips, or `max_iterations` model calls have been made.
    pub async fn run(
        &self,
        tool: Arc<dyn ComputerTool>,
        task: impl Into<String>,
        max_iterations: u32,
    ) -> LoopOutcome {
        let mut messages = vec![Message::user(task)];
        let mut iterations = 0;

        let (stop, error) = loop {
            if tool.is_stopped() {
                break (LoopStop::FailSafe, None);
            }
            if iterations >= max_iterations {
                warn!("Computer-use loop hit the iteration limit ({})", max_iterations);
                break (LoopStop::MaxIterations, None);
            }
            iterations += 1;
            debug!("Computer-use iteration {}", iterations);

            let response = match self.provider.complete(self.request(&messages)).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Model call failed in iteration {}: {}", iterations, e);
                    break (LoopStop::ProviderError, Some(e.to_string()));
                }
            };

            let text = response.message.text();
            if !text.is_empty() {
                info!("Model: {}", text);
            }

            let has_tool_use = response.has_tool_use();
            messages.push(response.message);
            if !has_tool_use {
                info!("Computer-use task completed after {} iterations", iterations);
                break (LoopStop::Completed, None);
            }

            let results = self.run_tool_uses(&tool, messages.last()).await;
            messages.push(Message::tool_results(results));

            if tool.is_stopped() {
                warn!("Fail-safe triggered, stopping the session");
                break (LoopStop::FailSafe, None);
            }
            tokio::time::sleep(self.config.between_iterations).await;
        };

        LoopOutcome {
            messages,
            iterations,
            stop,
            error,
        }
    }

    async fn run_tool_uses(
        &self,
        tool: &Arc<dyn ComputerTool>,
        message: Option<&Message>,
    ) -> Vec<ContentBlock> {
        let Some(message) = message else {
            return Vec::new();
        };

        let mut results = Vec::new();
        for tool_use in message.tool_uses() {
            if tool_use.name != COMPUTER_TOOL_NAME {
                warn!("Model asked for unknown tool '{}'", tool_use.name);
                results.push(ContentBlock::tool_result_text(
                    tool_use.id,
                    format!("Unknown tool: {}", tool_use.name),
                    true,
                ));
                continue;
            }

            let result = match execute_blocking(tool, tool_use.input.clone()).await {
                Ok(result) => result,
                Err(e) => ActionResult::error(e.to_string()),
            };
            log_result(&result);
            results.push(to_tool_result(tool_use.id, result));
        }
        results
    }
}

fn log_result(result: &ActionResult) {
    match &result.output {
        ActionOutput::Image { data, .. } => {
            info!("Result: screenshot ({} bytes of base64)", data.len())
        }
        ActionOutput::Captured(text) => {
            info!("Result: captured {} characters", text.chars().count())
        }
        ActionOutput::Text(text) if result.is_error => warn!("Result: {}", text),
        ActionOutput::Text(text) => info!("Result: {}", text),
    }
}

/// Screenshots go back as image blocks, everything else as text.
pub fn to_tool_result(tool_use_id: &str, result: ActionResult) -> ContentBlock {
    match result.output {
        ActionOutput::Image { media_type, data } => {
            ContentBlock::tool_result_image(tool_use_id, media_type, data)
        }
        ActionOutput::Text(text) | ActionOutput::Captured(text) => {
            ContentBlock::tool_result_text(tool_use_id, text, result.is_error)
        }
    }
}

#[cfg(test)]
#[path = "agent_loop_tests.rs"]
mod tests;
