//! The computer tool as seen by the runtime.

use std::sync::Arc;

use serde_json::Value;
use sitepilot_desktop::{ActionExecutor, ActionResult};
use sitepilot_protocols::AgentError;

/// Executes computer-tool inputs for one session.
pub trait ComputerTool: Send + Sync {
    /// Run one tool input. Blocking; never fails.
    fn execute(&self, input: &Value) -> ActionResult;

    /// Whether the user hit the emergency stop.
    fn is_stopped(&self) -> bool;
}

impl ComputerTool for ActionExecutor {
    fn execute(&self, input: &Value) -> ActionResult {
        ActionExecutor::execute(self, input)
    }

    fn is_stopped(&self) -> bool {
        self.failsafe().is_tripped()
    }
}

/// Run one tool input on the blocking pool.
pub async fn execute_blocking(
    tool: &Arc<dyn ComputerTool>,
    input: Value,
) -> Result<ActionResult, AgentError> {
    let tool = Arc::clone(tool);
    tokio::task::spawn_blocking(move || tool.execute(&input))
        .await
        .map_err(|e| AgentError::ExecutionFailed(e.to_string()))
}
