//! Cooperative cancellation for backend requests.
//!
//! A [`CancelHandle`] is owned by whoever issued a request; every
//! [`CancelSignal`] cloned from it observes the same flag. Transports use
//! the signal to stop waiting for a response, but correctness never depends
//! on that: callers must still guard state mutation with their own
//! request identity.

use std::future::Future;

use tokio::sync::watch;

use crate::error::BackendError;

/// Owning side of a cancellation flag. Dropping the handle cancels it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A signal bound to this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Flip the flag. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Observing side of a cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires, for callers without cancellation.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Resolves once the owning handle cancels (or is dropped).
    pub async fn cancelled(&self) {
        match &self.rx {
            Some(rx) => {
                let mut rx = rx.clone();
                // An Err means the handle is gone, which counts as cancelled.
                let _ = rx.wait_for(|cancelled| *cancelled).await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Drive `fut` unless the signal fires first.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, BackendError>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(BackendError::Cancelled),
            output = fut => Ok(output),
        }
    }
}
