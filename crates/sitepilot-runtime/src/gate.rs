//! Single-session admission gate.
//!
//! Only one automation session may drive the mouse, keyboard and clipboard
//! at a time. Admission never waits: a second caller gets
//! [`SessionError::Busy`] immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sitepilot_protocols::SessionError;
use tokio::task::JoinHandle;
use tracing::debug;

const FREE: u64 = 0;

#[derive(Debug, Default)]
struct GateState {
    /// Ticket of the current holder, `FREE` when nobody holds the gate.
    holder: AtomicU64,
    next_ticket: AtomicU64,
}

/// Non-blocking mutual exclusion for automation sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    state: Arc<GateState>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate or fail fast.
    pub fn try_acquire(&self) -> Result<GatePermit, SessionError> {
        let ticket = self.state.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
        self.state
            .holder
            .compare_exchange(FREE, ticket, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        debug!(ticket, "Session gate acquired");
        Ok(GatePermit {
            state: Arc::clone(&self.state),
            ticket,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.state.holder.load(Ordering::Acquire) != FREE
    }
}

/// Proof of holding the gate.
///
/// Clones refer to the same hold, so a timer and a failure path can both
/// try to release it. Release is idempotent and only ever frees the hold
/// this permit was issued for.
#[derive(Debug, Clone)]
pub struct GatePermit {
    state: Arc<GateState>,
    ticket: u64,
}

impl GatePermit {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Whether this permit's hold is still in place.
    pub fn is_held(&self) -> bool {
        self.state.holder.load(Ordering::Acquire) == self.ticket
    }

    /// Release the hold. Returns `false` if it was already released.
    pub fn release(&self) -> bool {
        let released = self
            .state
            .holder
            .compare_exchange(self.ticket, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if released {
            debug!(ticket = self.ticket, "Session gate released");
        }
        released
    }

    /// Release the hold from a background task once `delay` has passed.
    pub fn release_after(&self, delay: Duration) -> JoinHandle<bool> {
        let permit = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            permit.release()
        })
    }
}
