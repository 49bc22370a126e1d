//! Request-scoped cancellation.
//!
//! A [`Cancellation`] is a cloneable latch shared between whoever owns the
//! request (a server, a timeout, a test) and the validators running on its
//! behalf. Validators check it before doing work and report a cancelled
//! failure instead of a verdict once it has fired.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery_core::Cancellation;
//! use std::time::Duration;
//!
//! let cancel = Cancellation::with_timeout(Duration::from_secs(2));
//! tokio::select! {
//!     _ = cancel.cancelled() => println!("request took too long"),
//!     _ = do_work() => {}
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

/// A cancellation latch for one request.
///
/// Clones share the same state; cancelling any clone cancels all of them.
///
/// ```
/// use bindery_core::Cancellation;
///
/// let cancel = Cancellation::new();
/// let seen_by_validator = cancel.clone();
///
/// cancel.cancel();
/// assert!(seen_by_validator.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl Cancellation {
    /// Creates a latch that has not fired.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Creates a latch that fires after `timeout`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let cancel = Self::new();
        let timer = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::debug!(?timeout, "request cancelled by timeout");
            timer.cancel();
        });

        cancel
    }

    /// Fires the latch. Idempotent.
    pub fn cancel(&self) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once the latch has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Completes when the latch fires, immediately if it already has.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if self.is_cancelled() {
            return;
        }
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = receiver.recv().await;
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let cancel = Cancellation::default();
        assert!(!cancel.is_cancelled());
        cancel.cancel();
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_completes_after_fire() {
        let cancel = Cancellation::new();
        let waiter = cancel.cancelled();
        cancel.cancel();
        waiter.await;

        // Already fired: completes immediately.
        cancel.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires() {
        let cancel = Cancellation::with_timeout(Duration::from_millis(50));
        assert!(!cancel.is_cancelled());

        tokio::time::timeout(Duration::from_secs(1), cancel.cancelled())
            .await
            .unwrap();
        assert!(cancel.is_cancelled());
    }
}
