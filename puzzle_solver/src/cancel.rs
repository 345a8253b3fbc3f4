//! Cooperative cancellation for long-running searches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A cloneable flag that asks an in-progress search to stop.
///
/// The search checks the flag once per expansion iteration, so a request is
/// observed between node expansions, never in the middle of one.
///
/// # Examples
/// ```
/// use puzzle_solver::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let watcher = token.clone();
/// assert!(!watcher.is_cancelled());
/// token.cancel();
/// assert!(watcher.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Cancels this token once `timeout` elapses, unless the returned
    /// [`Deadline`] is dropped first.
    ///
    /// A watcher thread waits on a channel that the guard closes when dropped.
    pub fn cancel_after(&self, timeout: Duration) -> Deadline {
        let token = self.clone();
        let (stop, stopped) = mpsc::channel::<()>();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(timeout) {
                tracing::warn!(event = "deadline_reached", timeout_ms = timeout.as_millis() as u64);
                token.cancel();
            }
        });
        Deadline { _stop: stop }
    }
}

/// Guard returned by [`CancellationToken::cancel_after`]. Dropping it disarms
/// the timer.
#[derive(Debug)]
pub struct Deadline {
    _stop: mpsc::Sender<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_cancel_is_visible_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();
        thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_after_fires() {
        let token = CancellationToken::new();
        let _deadline = token.cancel_after(Duration::from_millis(10));
        let mut waited = 0;
        while !token.is_cancelled() && waited < 500 {
            thread::sleep(Duration::from_millis(10));
            waited += 1;
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_dropped_deadline_never_fires() {
        let token = CancellationToken::new();
        drop(token.cancel_after(Duration::from_millis(50)));
        thread::sleep(Duration::from_millis(150));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_independent_tokens() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        a.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
