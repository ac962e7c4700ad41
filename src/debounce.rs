//! Trailing-edge collapse of repeated render invocations.
//!
//! Expensive kinds re-render in bursts (surface resizes, streamed data
//! updates). The debouncer runs only the most recent invocation, once the
//! burst has gone quiet for a full collapse window; intermediate inputs
//! are discarded. The timer belongs to the node's slot and is cancelled
//! when the slot drops, so a late firing can never touch a dead slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// Render triggers closer together than this collapse into one. Tuned to
/// resize/update bursts.
pub const COLLAPSE_WINDOW: Duration = Duration::from_millis(150);

type Action<T> = Box<dyn Fn(T) + Send + Sync>;

struct Pending<T> {
    input: Option<T>,
    deadline: Instant,
    /// Whether a timer task is currently waiting on the deadline.
    armed: bool,
}

struct Inner<T> {
    window: Duration,
    action: Action<T>,
    pending: Mutex<Pending<T>>,
    cancelled: AtomicBool,
}

/// Node-owned trailing-edge timer.
pub struct Debouncer<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be created (and triggered) within a Tokio runtime.
    pub fn new(window: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                action: Box::new(action),
                pending: Mutex::new(Pending {
                    input: None,
                    deadline: Instant::now(),
                    armed: false,
                }),
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Record a trigger. The action runs with the latest recorded input
    /// once no further trigger arrives for a full window; earlier inputs
    /// from the same burst are discarded.
    pub fn trigger(&self, input: T) {
        let mut pending = self.inner.pending.lock().unwrap();
        if pending.input.is_some() {
            log::debug!("collapsing superseded render trigger");
        }
        pending.input = Some(input);
        pending.deadline = Instant::now() + self.inner.window;
        if !pending.armed {
            pending.armed = true;
            tokio::spawn(run_timer(self.inner.clone()));
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }
}

async fn run_timer<T: Send + 'static>(inner: Arc<Inner<T>>) {
    loop {
        let deadline = inner.pending.lock().unwrap().deadline;
        tokio::time::sleep_until(deadline).await;

        let mut pending = inner.pending.lock().unwrap();
        if Instant::now() < pending.deadline {
            // Extended by a later trigger; keep waiting.
            continue;
        }
        pending.armed = false;
        let input = pending.input.take();
        drop(pending);

        if inner.cancelled.load(Ordering::SeqCst) {
            return;
        }
        if let Some(input) = input {
            (inner.action)(input);
        }
        return;
    }
}
