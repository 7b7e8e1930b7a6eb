//! Test doubles and a router over them.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sitepilot_config::Config;
use sitepilot_desktop::{ActionResult, SpeedEstimate};
use sitepilot_protocols::error::ProviderError;
use sitepilot_protocols::provider::{
    ChunkType, CompletionChunk, CompletionRequest, CompletionResponse, CompletionStream,
    LLMProvider,
};
use sitepilot_protocols::types::{ContentBlock, Message, MessageRole, StopReason, Usage};
use sitepilot_runtime::{ComputerTool, EndpointStore, SessionManager, ToolFactory};

use crate::state::AppState;

pub fn text_reply(text: &str) -> CompletionResponse {
    CompletionResponse {
        id: "msg_stub".to_string(),
        model: "stub".to_string(),
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
    }
}

pub fn computer_reply(id: &str, input: Value) -> CompletionResponse {
    CompletionResponse {
        message: Message {
            role: MessageRole::Assistant,
            content: vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: "computer".to_string(),
                input,
            }],
        },
        stop_reason: StopReason::ToolUse,
        ..text_reply("")
    }
}

/// Answers with queued responses, then "done". Streams `stream_parts`.
#[derive(Default)]
pub struct StubProvider {
    replies: Mutex<VecDeque<CompletionResponse>>,
    stream_parts: Vec<String>,
    fail: bool,
}

impl StubProvider {
    pub fn new(replies: Vec<CompletionResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| text_reply(t)).collect())
    }

    pub fn streaming(parts: &[&str]) -> Self {
        Self {
            stream_parts: parts.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn id(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        if self.fail {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        Ok(self.replies.lock().pop_front().unwrap_or_else(|| text_reply("done")))
    }

    async fn complete_stream(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        if self.fail {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        let mut chunks = vec![Ok(CompletionChunk::new(ChunkType::MessageStart))];
        chunks.extend(self.stream_parts.iter().map(|p| Ok(CompletionChunk::text(p.clone()))));
        chunks.push(Ok(CompletionChunk::new(ChunkType::MessageEnd)));
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

pub const CAPTURED_PAGE: &str = "<html><body><div class=\"product\">Mochi</div></body></html>";

/// Accepts every action without touching the desktop. `capture_html`
/// returns [`CAPTURED_PAGE`].
pub struct NoopTool;

impl ComputerTool for NoopTool {
    fn execute(&self, input: &Value) -> ActionResult {
        match input["action"].as_str().unwrap_or_default() {
            "capture_html" => ActionResult::captured(CAPTURED_PAGE.to_string()),
            action => ActionResult::text(format!("did {}", action)),
        }
    }

    fn is_stopped(&self) -> bool {
        false
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.session.user_warning_delay_secs = 0.0;
    config.session.page_load_wait_secs = 0.0;
    config.session.between_iterations_secs = 0.0;
    config.session.lock_release_delay_secs = 30.0;
    config
}

pub fn test_state(config: Config, provider: StubProvider, cache_dir: &Path) -> Arc<AppState> {
    let store =
        Arc::new(EndpointStore::open(cache_dir, &config.endpoints.always_registered).unwrap());
    let speed = Arc::new(SpeedEstimate::from_config(&config.overlay));
    let tools: ToolFactory = Arc::new(|| Arc::new(NoopTool) as Arc<dyn ComputerTool>);
    let sessions =
        SessionManager::with_tools(Arc::new(config), Arc::new(provider), tools, speed, store);
    Arc::new(AppState::new(Arc::new(sessions)))
}
