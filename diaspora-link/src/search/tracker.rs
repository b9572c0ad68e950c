//! Latest-request-wins tracking for keystroke-driven lookups.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Issues increasing tokens; only the most recently issued one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer token has been issued since `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Run `request`, discarding its output if a newer request started
    /// while it was in flight.
    pub async fn run_latest<F: Future>(&self, request: F) -> Option<F::Output> {
        let token = self.issue();
        let output = request.await;
        if self.is_current(token) {
            Some(output)
        } else {
            tracing::debug!(token = token.0, "discarding stale response");
            None
        }
    }
}
