//! Cancellation and deadline scope carried by every driver.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheError;

/// A cancellation token plus an optional deadline.
///
/// Cloning shares the token: cancelling any clone cancels them all.
/// Use [`CacheContext::child`] for a scope that can be cancelled on its own.
#[derive(Debug, Clone, Default)]
pub struct CacheContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CacheContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now. A timeout too large to
    /// represent leaves the context without a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::new().deadline(deadline),
            None => Self::new(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self::new().deadline(deadline)
    }

    /// Narrow the deadline; a later deadline than the current one is ignored.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Child scope: cancelled with the parent, cancellable independently.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// The error describing why the context is done.
    pub fn err(&self) -> Option<CacheError> {
        if self.token.is_cancelled() {
            Some(CacheError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(CacheError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Run `fut` unless the context finishes first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, CacheError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            _ = self.done() => Err(self.err().unwrap_or(CacheError::Cancelled)),
            out = fut => Ok(out),
        }
    }
}
