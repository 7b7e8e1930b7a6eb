//! Completion request types.

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Request for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model to use.
    pub model: String,

    /// Messages in the conversation.
    pub messages: Vec<Message>,

    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Tools offered to the model.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a new completion request.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            tools: Vec::new(),
            max_tokens: None,
        }
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether any tool requires the computer-use beta.
    pub fn uses_computer(&self) -> bool {
        self.tools.iter().any(|t| matches!(t, ToolSpec::Computer { .. }))
    }
}

/// A tool offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSpec {
    /// The provider-defined computer-use tool.
    Computer {
        display_width_px: u32,
        display_height_px: u32,
    },

    /// A regular JSON-schema function tool.
    Function {
        name: String,
        description: String,
        input_schema: serde_json::Value,
    },
}

impl ToolSpec {
    /// Name the model uses when calling this tool.
    pub fn name(&self) -> &str {
        match self {
            ToolSpec::Computer { .. } => "computer",
            ToolSpec::Function { name, .. } => name,
        }
    }
}
