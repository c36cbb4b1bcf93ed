//! Delayed, replaceable background jobs.

use std::future::Future;
use std::time::Duration;

use larder_core::{CancelHandle, CancelSignal};
use tokio::task::JoinHandle;

struct Pending {
    task: JoinHandle<()>,
    cancel: CancelHandle,
}

/// Runs at most one job at a time, each after its own delay.
///
/// Scheduling a job cancels the previous one, whether it is still waiting
/// out its delay or already running. The job receives a [`CancelSignal`]
/// that fires when it is superseded, and its task is aborted as well.
/// Dropping the debouncer cancels whatever is pending.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct Debouncer {
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F, Fut>(&mut self, delay: Duration, job: F)
    where
        F: FnOnce(CancelSignal) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let cancel = CancelHandle::new();
        let signal = cancel.signal();
        let task = tokio::spawn(async move {
            if !delay.is_zero() && signal.guard(tokio::time::sleep(delay)).await.is_err() {
                return;
            }
            job(signal).await;
        });
        self.pending = Some(Pending { task, cancel });
    }

    /// Cancel the pending job, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
            pending.task.abort();
        }
    }

    /// Whether a job is waiting or running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_collapse_to_last() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new();

        for i in 0..5u32 {
            let log = log.clone();
            debouncer.schedule(Duration::from_millis(300), move |_| async move {
                log.lock().unwrap().push(i);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*log.lock().unwrap(), vec![4]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_runs_immediately() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        let counter = runs.clone();
        debouncer.schedule(Duration::ZERO, move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::task::yield_now().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_job_is_stopped() {
        let observed = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        let seen = observed.clone();
        debouncer.schedule(Duration::ZERO, move |signal| async move {
            // Outlives the next schedule call; aborted before it finishes.
            let _ = signal.guard(tokio::time::sleep(Duration::from_secs(10))).await;
            seen.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(debouncer.is_pending());

        debouncer.schedule(Duration::ZERO, |_| async {});
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_job() {
        let runs = Arc::new(AtomicUsize::new(0));
        {
            let mut debouncer = Debouncer::new();
            let counter = runs.clone();
            debouncer.schedule(Duration::from_millis(300), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
