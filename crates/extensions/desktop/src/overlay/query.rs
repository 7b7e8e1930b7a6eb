//! Native overlay visibility query through `osascript`.

use std::time::Duration;

use sitepilot_config::DetectorConfig;
use thiserror::Error;

use crate::backend::OverlayQuery;

/// Native query errors. Always recovered by the detector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Native overlay query is not supported on this platform")]
    Unsupported,

    #[error("Native overlay query is disabled")]
    Disabled,

    #[error("Failed to run query: {0}")]
    Spawn(String),

    #[error("Query failed: {0}")]
    Failed(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected query output: {0:?}")]
    Unparsable(String),
}

/// Asks System Events whether the overlay window exists.
pub struct AppleScriptQuery {
    process: String,
    window: String,
    timeout: Duration,
}

impl AppleScriptQuery {
    pub fn new(process: impl Into<String>, window: impl Into<String>, timeout: Duration) -> Self {
        Self {
            process: process.into(),
            window: window.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.process_name.clone(),
            config.window_name.clone(),
            config.query_timeout(),
        )
    }

    /// AppleScript source sent to `osascript`.
    pub fn script(&self) -> String {
        format!(
            r#"tell application "System Events" to return exists window "{}" of application process "{}""#,
            escape(&self.window),
            escape(&self.process)
        )
    }
}

impl OverlayQuery for AppleScriptQuery {
    fn is_visible(&self) -> Result<bool, QueryError> {
        if self.timeout.is_zero() {
            return Err(QueryError::Disabled);
        }
        self.run_script()
    }
}

impl AppleScriptQuery {
    #[cfg(target_os = "macos")]
    fn run_script(&self) -> Result<bool, QueryError> {
        use std::io::Read;
        use std::process::{Command, Stdio};
        use std::thread;
        use std::time::Instant;

        let mut child = Command::new("osascript")
            .arg("-e")
            .arg(self.script())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| QueryError::Spawn(e.to_string()))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(QueryError::Timeout(self.timeout));
                }
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(e) => return Err(QueryError::Failed(e.to_string())),
            }
        };

        if !status.success() {
            return Err(QueryError::Failed(format!("osascript exited with {}", status)));
        }

        let mut stdout = String::new();
        if let Some(mut out) = child.stdout.take() {
            out.read_to_string(&mut stdout)
                .map_err(|e| QueryError::Failed(e.to_string()))?;
        }
        parse_output(&stdout)
    }

    #[cfg(not(target_os = "macos"))]
    fn run_script(&self) -> Result<bool, QueryError> {
        Err(QueryError::Unsupported)
    }
}

/// `true` / `false` from the script; anything else is unparsable.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn parse_output(output: &str) -> Result<bool, QueryError> {
    match output.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(QueryError::Unparsable(other.to_string())),
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
