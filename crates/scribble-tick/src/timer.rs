//! Explicitly cancellable background tasks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Owns a spawned timer task.
///
/// Calling [`cancel`](Self::cancel), or dropping the handle, aborts the
/// task. A task that finishes its own work and must not be aborted by its
/// owner afterwards is released with [`detach`](Self::detach).
#[derive(Debug)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Spawns `fut` on the current Tokio runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(fut)),
        }
    }

    /// Spawns `fut` to run once `delay` has elapsed.
    pub fn after<F>(delay: Duration, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        })
    }

    /// Aborts the task. Safe to call on an already finished task.
    pub fn cancel(mut self) {
        self.abort();
    }

    /// Releases the task without aborting it.
    pub fn detach(mut self) {
        self.task.take();
    }

    /// Whether the task has run to completion (or was aborted).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
