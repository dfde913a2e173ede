//! Cancellable handle for a scheduled reconnect.

use std::time::Duration;
use tokio::task::JoinHandle;

/// A one-shot delayed callback that is cancelled when dropped.
///
/// Cancellation is idempotent and synchronous: once [`cancel`](Self::cancel)
/// returns, the callback will not start.
#[derive(Debug)]
pub struct ReconnectTimer {
    handle: Option<JoinHandle<()>>,
    delay: Duration,
}

impl ReconnectTimer {
    /// Schedules `callback` to run after `delay` on the current runtime.
    pub fn schedule<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Self {
            handle: Some(handle),
            delay,
        }
    }

    /// Returns the scheduled delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns true if the callback has run or was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels the callback if it has not started.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Releases the handle without cancelling; used by the callback itself.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let timer = ReconnectTimer::schedule(Duration::from_secs(3), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(timer.delay(), Duration::from_secs(3));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_callback() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut timer = ReconnectTimer::schedule(Duration::from_secs(3), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();
        timer.cancel();
        assert!(timer.is_finished());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        drop(ReconnectTimer::schedule(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
