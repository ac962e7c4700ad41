//! Shared, memoized deferred loading of renderer implementations.
//!
//! The first render of a deferred kind starts one load for the whole
//! process: `NotRequested → Loading → {Resolved | Failed}`, with the
//! terminal phases cached so later nodes of the kind skip the loading
//! step entirely. Nodes subscribe to the shared task; dropping a
//! subscription detaches that node without cancelling the load.
//!
//! Loads run as Tokio tasks, the same substrate the rest of the core's
//! background work uses, so [`DeferredLoader::poll`] must be called
//! within a runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::element::ElementKind;
use crate::error::LoadError;
use crate::registry::{ElementRenderer, RendererLoader};
use crate::wake::WakeSignal;

/// Lifecycle of one kind's implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotRequested,
    Loading,
    Resolved,
    Failed,
}

/// Broadcast payload of one kind's shared load.
#[derive(Clone)]
pub enum LoadPhase {
    Loading,
    Resolved(Arc<dyn ElementRenderer>),
    Failed(LoadError),
}

impl LoadPhase {
    pub fn state(&self) -> LoadState {
        match self {
            LoadPhase::Loading => LoadState::Loading,
            LoadPhase::Resolved(_) => LoadState::Resolved,
            LoadPhase::Failed(_) => LoadState::Failed,
        }
    }
}

impl fmt::Debug for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPhase::Loading => write!(f, "Loading"),
            LoadPhase::Resolved(_) => write!(f, "Resolved"),
            LoadPhase::Failed(err) => write!(f, "Failed({err})"),
        }
    }
}

/// Outcome of polling a kind's implementation during a render pass.
pub enum LoadPoll {
    /// Implementation available; render now.
    Ready(Arc<dyn ElementRenderer>),
    /// Load in flight; the node suspends behind this subscription.
    Pending(LoadSubscription),
    /// The load failed earlier; cached so the node fails fast.
    Failed(LoadError),
}

/// A node's handle onto a shared in-flight load.
///
/// Dropping it detaches the node silently — no render, no error — while
/// the shared load keeps running for whoever else depends on it.
pub struct LoadSubscription {
    rx: watch::Receiver<LoadPhase>,
}

impl LoadSubscription {
    pub fn phase(&self) -> LoadPhase {
        self.rx.borrow().clone()
    }

    /// Wait until the shared load reaches a terminal phase.
    pub async fn settled(&mut self) -> LoadPhase {
        loop {
            let phase = self.rx.borrow_and_update().clone();
            if !matches!(phase, LoadPhase::Loading) {
                return phase;
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().clone();
            }
        }
    }
}

/// Process-wide deferred-load table, one slot per kind.
pub struct DeferredLoader {
    wake: WakeSignal,
    slots: Mutex<HashMap<ElementKind, Arc<watch::Sender<LoadPhase>>>>,
}

impl DeferredLoader {
    pub fn new(wake: WakeSignal) -> Self {
        Self {
            wake,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of a kind's implementation.
    pub fn state(&self, kind: ElementKind) -> LoadState {
        self.slots
            .lock()
            .unwrap()
            .get(&kind)
            .map(|tx| tx.borrow().state())
            .unwrap_or(LoadState::NotRequested)
    }

    /// True while any kind's load is in flight. Feeds the host's settled
    /// readout for external verification tooling.
    pub fn any_loading(&self) -> bool {
        self.slots
            .lock()
            .unwrap()
            .values()
            .any(|tx| matches!(&*tx.borrow(), LoadPhase::Loading))
    }

    /// Subscribers currently attached to a kind's load.
    pub fn subscriber_count(&self, kind: ElementKind) -> usize {
        self.slots
            .lock()
            .unwrap()
            .get(&kind)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Poll a kind's implementation, starting the shared load on first
    /// touch.
    pub fn poll(&self, kind: ElementKind, source: &Arc<dyn RendererLoader>) -> LoadPoll {
        let mut slots = self.slots.lock().unwrap();

        if let Some(tx) = slots.get(&kind) {
            return match tx.borrow().clone() {
                LoadPhase::Resolved(renderer) => LoadPoll::Ready(renderer),
                LoadPhase::Failed(err) => LoadPoll::Failed(err),
                LoadPhase::Loading => LoadPoll::Pending(LoadSubscription {
                    rx: tx.subscribe(),
                }),
            };
        }

        log::debug!("loading implementation for `{kind}`");
        let (tx, rx) = watch::channel(LoadPhase::Loading);
        let tx = Arc::new(tx);
        slots.insert(kind, tx.clone());

        let fut = source.load();
        let wake = self.wake.clone();
        tokio::spawn(async move {
            let phase = match fut.await {
                Ok(renderer) => {
                    log::debug!("implementation for `{kind}` resolved");
                    LoadPhase::Resolved(renderer)
                }
                Err(err) => {
                    log::error!("implementation for `{kind}` failed to load: {err}");
                    LoadPhase::Failed(err)
                }
            };
            // send_replace: the terminal phase must be recorded even if
            // every subscriber has already gone away.
            tx.send_replace(phase);
            wake.request();
        });

        LoadPoll::Pending(LoadSubscription { rx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementNode;
    use crate::error::RenderError;
    use crate::registry::{ElementView, LoadFuture, RenderProps};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Debug)]
    struct StubView;

    impl ElementView for StubView {
        fn tag(&self) -> &'static str {
            "stub"
        }
    }

    struct StubRenderer;

    impl ElementRenderer for StubRenderer {
        fn render(
            &self,
            _node: &ElementNode,
            _props: &RenderProps<'_>,
        ) -> Result<Box<dyn ElementView>, RenderError> {
            Ok(Box::new(StubView))
        }
    }

    /// Loader whose completion the test controls through a gate.
    struct GatedLoader {
        calls: Arc<AtomicUsize>,
        gate: Arc<Notify>,
        fail: bool,
    }

    impl GatedLoader {
        fn new(fail: bool) -> (Arc<dyn RendererLoader>, Arc<AtomicUsize>, Arc<Notify>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let gate = Arc::new(Notify::new());
            let loader = Arc::new(GatedLoader {
                calls: calls.clone(),
                gate: gate.clone(),
                fail,
            });
            (loader, calls, gate)
        }
    }

    impl RendererLoader for GatedLoader {
        fn load(&self) -> LoadFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.clone();
            let fail = self.fail;
            Box::pin(async move {
                gate.notified().await;
                if fail {
                    Err(LoadError::new("implementation fetch failed"))
                } else {
                    Ok(Arc::new(StubRenderer) as Arc<dyn ElementRenderer>)
                }
            })
        }
    }

    #[tokio::test]
    async fn test_first_poll_starts_single_shared_load() {
        let loader = DeferredLoader::new(WakeSignal::new());
        let (source, calls, gate) = GatedLoader::new(false);

        assert_eq!(loader.state(ElementKind::PlotlyChart), LoadState::NotRequested);

        let first = loader.poll(ElementKind::PlotlyChart, &source);
        let second = loader.poll(ElementKind::PlotlyChart, &source);
        assert!(matches!(first, LoadPoll::Pending(_)));
        assert!(matches!(second, LoadPoll::Pending(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.state(ElementKind::PlotlyChart), LoadState::Loading);
        assert!(loader.any_loading());

        gate.notify_one();
        let LoadPoll::Pending(mut sub) = first else {
            unreachable!()
        };
        assert!(matches!(sub.settled().await, LoadPhase::Resolved(_)));

        assert_eq!(loader.state(ElementKind::PlotlyChart), LoadState::Resolved);
        assert!(!loader.any_loading());
        assert!(matches!(
            loader.poll(ElementKind::PlotlyChart, &source),
            LoadPoll::Ready(_)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_terminal_and_cached() {
        let loader = DeferredLoader::new(WakeSignal::new());
        let (source, calls, gate) = GatedLoader::new(true);

        let LoadPoll::Pending(mut sub) = loader.poll(ElementKind::BokehChart, &source) else {
            panic!("expected pending");
        };
        gate.notify_one();
        assert!(matches!(sub.settled().await, LoadPhase::Failed(_)));

        // Later nodes fail fast without re-attempting the load.
        assert!(matches!(
            loader.poll(ElementKind::BokehChart, &source),
            LoadPoll::Failed(_)
        ));
        assert_eq!(loader.state(ElementKind::BokehChart), LoadState::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscription_drop_leaves_shared_load_running() {
        let loader = DeferredLoader::new(WakeSignal::new());
        let (source, _calls, gate) = GatedLoader::new(false);

        let first = loader.poll(ElementKind::Video, &source);
        let second = loader.poll(ElementKind::Video, &source);
        assert_eq!(loader.subscriber_count(ElementKind::Video), 2);

        // One node leaves the tree; its subscription vanishes silently.
        drop(first);
        assert_eq!(loader.subscriber_count(ElementKind::Video), 1);

        gate.notify_one();
        let LoadPoll::Pending(mut sub) = second else {
            unreachable!()
        };
        assert!(matches!(sub.settled().await, LoadPhase::Resolved(_)));
        assert_eq!(loader.state(ElementKind::Video), LoadState::Resolved);
    }

    #[tokio::test]
    async fn test_completion_requests_wake() {
        let wake = WakeSignal::new();
        let loader = DeferredLoader::new(wake.clone());
        let (source, _calls, gate) = GatedLoader::new(false);

        let LoadPoll::Pending(mut sub) = loader.poll(ElementKind::Json, &source) else {
            panic!("expected pending");
        };
        assert!(!wake.take());

        gate.notify_one();
        sub.settled().await;
        assert!(wake.take());
    }

    #[tokio::test]
    async fn test_loads_are_per_kind() {
        let loader = DeferredLoader::new(WakeSignal::new());
        let (video_source, video_calls, _video_gate) = GatedLoader::new(false);
        let (audio_source, audio_calls, _audio_gate) = GatedLoader::new(false);

        loader.poll(ElementKind::Video, &video_source);
        loader.poll(ElementKind::Audio, &audio_source);
        loader.poll(ElementKind::Video, &video_source);

        assert_eq!(video_calls.load(Ordering::SeqCst), 1);
        assert_eq!(audio_calls.load(Ordering::SeqCst), 1);
    }
}
