use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub(crate) enum Cancel {
    /// Nothing was scheduled.
    Idle,
    /// The task was stopped before it fired.
    Stopped,
    /// The task already fired, the handle completes once it is done.
    Fired(JoinHandle<()>),
}

/// A single cancellable delayed task. Scheduling again cancels the previous
/// one, so at most one can ever fire.
///
/// The timer and `cancel` race for a claim flag, so a task is either stopped
/// or fired, never both.
#[derive(Debug, Default)]
pub(crate) struct Debounce {
    handle: Option<JoinHandle<()>>,
    claimed: Arc<AtomicBool>,
}

impl Debounce {
    pub(crate) fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = self.cancel();
        let claimed = Arc::new(AtomicBool::new(false));
        self.claimed = claimed.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !claimed.swap(true, Ordering::SeqCst) {
                task.await;
            }
        }));
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.handle.is_some() && !self.claimed.load(Ordering::SeqCst)
    }

    pub(crate) fn cancel(&mut self) -> Cancel {
        let Some(handle) = self.handle.take() else {
            return Cancel::Idle;
        };
        if self.claimed.swap(true, Ordering::SeqCst) {
            Cancel::Fired(handle)
        } else {
            handle.abort();
            Cancel::Stopped
        }
    }
}
