//! Owned debounce timer handle.
//!
//! Each [`DebounceTimer::reset`] replaces the pending callback, so a burst of
//! triggers collapses into one callback that runs once the quiet period has
//! elapsed. The callback runs on the tokio runtime the timer was reset from.

use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Resettable single-shot timer
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Quiet period that must elapse before the callback fires
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period with a new callback.
    ///
    /// Any callback still waiting from an earlier reset is dropped without
    /// running. Must be called from within a tokio runtime.
    pub fn reset<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Drop the waiting callback, if any. Returns whether one was waiting.
    pub fn clear(&self) -> bool {
        match self.lock().take() {
            Some(handle) => {
                let was_waiting = !handle.is_finished();
                handle.abort();
                was_waiting
            }
            None => false,
        }
    }

    /// Whether a callback is still waiting for its quiet period
    pub fn is_pending(&self) -> bool {
        self.lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.lock().take() {
            tracing::trace!("dropping debounce timer with pending callback");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_callback() {
        let timer = DebounceTimer::new(Duration::from_millis(100));
        let fired = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let fired = fired.clone();
            timer.reset(move || fired.lock().unwrap().push(i));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert!(timer.is_pending());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*fired.lock().unwrap(), vec![4]);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_callback() {
        let timer = DebounceTimer::new(Duration::from_millis(100));
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        timer.reset(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(timer.clear());
        assert!(!timer.clear());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let timer = DebounceTimer::new(Duration::from_millis(450));
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        timer.reset(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(449)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.clear());
    }
}
