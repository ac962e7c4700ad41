//! Frame-request plumbing between the core's background work and the
//! shell's scheduler.
//!
//! Deferred-load completions and debounce firings happen off the render
//! path; they request a new render pass here and the shell drains the
//! request at the top of its loop. Requests are coalesced so a burst of
//! completions nudges the event loop once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

type Waker = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct WakeInner {
    requested: AtomicBool,
    waker: OnceLock<Waker>,
}

/// Shared handle for requesting a render pass.
#[derive(Clone, Default)]
pub struct WakeSignal {
    inner: Arc<WakeInner>,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback that nudges the shell's event loop awake.
    /// One-time; later installs are ignored.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        let _ = self.inner.waker.set(Box::new(waker));
    }

    /// Request a render pass.
    ///
    /// Only the first request after a [`take`](WakeSignal::take) invokes
    /// the waker, so repeated completions in one burst cost one nudge.
    pub fn request(&self) {
        let was_requested = self.inner.requested.swap(true, Ordering::Relaxed);
        if !was_requested {
            if let Some(waker) = self.inner.waker.get() {
                waker();
            }
        }
    }

    /// Whether a pass has been requested since the last call; clears the
    /// flag.
    pub fn take(&self) -> bool {
        self.inner.requested.swap(false, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_take_clears_request() {
        let wake = WakeSignal::new();
        assert!(!wake.take());
        wake.request();
        assert!(wake.take());
        assert!(!wake.take());
    }

    #[test]
    fn test_requests_coalesce_into_one_nudge() {
        let wake = WakeSignal::new();
        let nudges = Arc::new(AtomicUsize::new(0));
        let counter = nudges.clone();
        wake.set_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        wake.request();
        wake.request();
        wake.request();
        assert_eq!(nudges.load(Ordering::SeqCst), 1);

        assert!(wake.take());
        wake.request();
        assert_eq!(nudges.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let wake = WakeSignal::new();
        let other = wake.clone();
        other.request();
        assert!(wake.take());
    }
}
