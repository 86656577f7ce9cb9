use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::error::{CardError, CardResult};

/// Cloneable cancellation signal with an optional deadline.
///
/// Clones share one flag. A [`child`](CancelToken::child) has its own flag but also
/// observes every ancestor's flag and deadline, so cancelling a batch token stops its
/// workers without touching the caller's token.
#[derive(Clone, Debug)]
pub struct CancelToken {
    node: Arc<Node>,
}

#[derive(Debug)]
struct Node {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Arc<Node>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token with no deadline that is cancelled only by [`CancelToken::cancel`].
    pub fn new() -> Self {
        Self::from_parts(None, None)
    }

    /// A token that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A token that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::from_parts(Some(deadline), None)
    }

    /// A token that is cancelled whenever `self` is, and can also be cancelled alone.
    pub fn child(&self) -> Self {
        Self::from_parts(None, Some(self.node.clone()))
    }

    /// Like [`CancelToken::child`], with an additional deadline of its own.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        Self::from_parts(Some(Instant::now() + timeout), Some(self.node.clone()))
    }

    fn from_parts(deadline: Option<Instant>, parent: Option<Arc<Node>>) -> Self {
        Self {
            node: Arc::new(Node {
                cancelled: AtomicBool::new(false),
                deadline,
                parent,
            }),
        }
    }

    /// Request cancellation of this token and all of its children.
    pub fn cancel(&self) {
        self.node.cancelled.store(true, Ordering::Release);
    }

    /// True once this token or any ancestor was cancelled or passed its deadline.
    pub fn is_cancelled(&self) -> bool {
        let now = Instant::now();
        let mut node = Some(&self.node);
        while let Some(n) = node {
            if n.cancelled.load(Ordering::Acquire) {
                return true;
            }
            if n.deadline.is_some_and(|d| now >= d) {
                return true;
            }
            node = n.parent.as_ref();
        }
        false
    }

    /// Earliest deadline along the ancestor chain.
    pub fn deadline(&self) -> Option<Instant> {
        let mut earliest: Option<Instant> = None;
        let mut node = Some(&self.node);
        while let Some(n) = node {
            if let Some(d) = n.deadline {
                earliest = Some(earliest.map_or(d, |e| e.min(d)));
            }
            node = n.parent.as_ref();
        }
        earliest
    }

    /// Time left before the earliest deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// `Err(CardError::Cancelled)` naming `what` if the token is cancelled.
    pub fn check(&self, what: &str) -> CardResult<()> {
        if self.is_cancelled() {
            return Err(CardError::cancelled(format!("{what} was cancelled")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/cancel.rs"]
mod tests;
