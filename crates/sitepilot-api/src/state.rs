//! Application state.

use std::sync::Arc;
use std::time::Instant;

use sitepilot_runtime::SessionManager;

/// Application state shared across handlers.
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    start_time: Instant,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
