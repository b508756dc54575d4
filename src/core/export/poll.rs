//! Waiting primitives for the status poll loop
//!
//! [`ExportContext`] carries the caller's shutdown signal and deadline.
//! [`Delay`] abstracts the pause between status queries so tests can run the
//! loop without real time passing.

use crate::domain::errors::CancelReason;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Pause between status queries
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// [`Delay`] backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Cancellation scope of one export
///
/// Cancelled when the shutdown signal flips to `true` or the deadline
/// passes, whichever happens first.
///
/// # Example
///
/// ```
/// use vmexport::core::export::ExportContext;
/// use std::time::Duration;
/// use tokio::sync::watch;
///
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let ctx = ExportContext::new(shutdown_rx).with_timeout(Duration::from_secs(3600));
/// assert!(ctx.check().is_none());
///
/// shutdown_tx.send(true).unwrap();
/// assert!(ctx.check().is_some());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ExportContext {
    shutdown: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl ExportContext {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            shutdown,
            deadline: None,
        }
    }

    /// A context that is never cancelled
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(rx)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the deadline `timeout` from now
    ///
    /// A timeout too large to represent leaves the context without deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation reason if the context is already done
    pub fn check(&self) -> Option<CancelReason> {
        if *self.shutdown.borrow() {
            return Some(CancelReason::Shutdown);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled
    ///
    /// Never resolves for a context without deadline whose shutdown sender
    /// was dropped without signalling.
    pub async fn cancelled(&self) -> CancelReason {
        let mut shutdown = self.shutdown.clone();
        let signalled = async move {
            loop {
                if *shutdown.borrow_and_update() {
                    return;
                }
                if shutdown.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = signalled => CancelReason::Shutdown,
                _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                signalled.await;
                CancelReason::Shutdown
            }
        }
    }
}
