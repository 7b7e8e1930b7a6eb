//! Test doubles for the model and the computer tool.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sitepilot_desktop::ActionResult;
use sitepilot_protocols::error::ProviderError;
use sitepilot_protocols::provider::{
    ChunkType, CompletionChunk, CompletionRequest, CompletionResponse, CompletionStream,
    LLMProvider,
};
use sitepilot_protocols::types::{ContentBlock, Message, MessageRole, StopReason, Usage};

use crate::tool::ComputerTool;

pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        id: "msg_test".to_string(),
        model: "mock".to_string(),
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
    }
}

pub fn tool_response(calls: &[(&str, &str, Value)]) -> CompletionResponse {
    CompletionResponse {
        id: "msg_test".to_string(),
        model: "mock".to_string(),
        message: Message {
            role: MessageRole::Assistant,
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: input.clone(),
                })
                .collect(),
        },
        stop_reason: StopReason::ToolUse,
        usage: Usage::default(),
    }
}

pub fn computer_call(id: &str, input: Value) -> CompletionResponse {
    tool_response(&[(id, "computer", input)])
}

/// Replays queued responses and records every request. An empty queue
/// answers with a plain "done".
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<CompletionResponse, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    stream_parts: Vec<String>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<CompletionResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    pub fn streaming(parts: &[&str]) -> Self {
        Self {
            stream_parts: parts.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("done")))
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, ProviderError> {
        self.requests.lock().push(request);
        let mut chunks = vec![Ok(CompletionChunk::new(ChunkType::MessageStart))];
        chunks.extend(self.stream_parts.iter().map(|p| Ok(CompletionChunk::text(p.clone()))));
        chunks.push(Ok(CompletionChunk::new(ChunkType::MessageEnd)));
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Records tool inputs and answers by action name.
#[derive(Default)]
pub struct ScriptedTool {
    inputs: Mutex<Vec<Value>>,
    results: Mutex<HashMap<String, ActionResult>>,
    stop_on: Option<String>,
    stopped: AtomicBool,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `action` with `result` instead of the default status text.
    pub fn with_result(self, action: &str, result: ActionResult) -> Self {
        self.results.lock().insert(action.to_string(), result);
        self
    }

    /// Trip the stop flag when `action` is executed.
    pub fn stopping_on(mut self, action: &str) -> Self {
        self.stop_on = Some(action.to_string());
        self
    }

    pub fn inputs(&self) -> Vec<Value> {
        self.inputs.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.inputs()
            .iter()
            .map(|i| i["action"].as_str().unwrap_or("<none>").to_string())
            .collect()
    }
}

impl ComputerTool for ScriptedTool {
    fn execute(&self, input: &Value) -> ActionResult {
        self.inputs.lock().push(input.clone());
        let action = input["action"].as_str().unwrap_or_default().to_string();
        if self.stop_on.as_deref() == Some(action.as_str()) {
            self.stopped.store(true, Ordering::SeqCst);
        }
        self.results
            .lock()
            .get(&action)
            .cloned()
            .unwrap_or_else(|| match action.as_str() {
                "screenshot" => ActionResult::png("iVBORw0KGgo=".to_string()),
                _ => ActionResult::text(format!("did {}", action)),
            })
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
