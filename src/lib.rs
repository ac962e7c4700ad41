pub mod context;
pub mod debounce;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod isolate;
pub mod loader;
pub mod policy;
pub mod registry;
pub mod run;
pub mod wake;

use std::sync::Arc;
use std::time::Duration;

use dispatch::Dispatcher;
use loader::DeferredLoader;
use registry::Registry;
use run::ScriptRunState;
use wake::WakeSignal;

pub mod prelude {
    pub use crate::context::{Collaborators, FormsData, RenderContext};
    pub use crate::dispatch::{Dispatch, Dispatcher, RenderedElement};
    pub use crate::element::payload::ElementPayload;
    pub use crate::element::{DataGrid, ElementId, ElementKey, ElementKind, ElementNode};
    pub use crate::error::{DispatchError, NodeFailure, RegistryError, RenderError};
    pub use crate::isolate::{NodeSlot, RenderOutput};
    pub use crate::registry::{
        standard_flags, ElementRenderer, ElementView, KindFlags, Registry, RenderProps,
        RendererDescriptor, SizeHint,
    };
    pub use crate::run::{RunId, ScriptRunState};
    pub use crate::{ElementHost, HostConfig};
}

/// Tunables for an [`ElementHost`].
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Window within which repeated render triggers of a debounced kind
    /// collapse into one.
    pub collapse_window: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            collapse_window: debounce::COLLAPSE_WINDOW,
        }
    }
}

impl HostConfig {
    pub fn collapse_window(mut self, window: Duration) -> Self {
        self.collapse_window = window;
        self
    }
}

/// State shared by every node slot a host mints.
pub(crate) struct HostShared {
    pub(crate) registry: Arc<Registry>,
    pub(crate) loader: Arc<DeferredLoader>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) wake: WakeSignal,
    pub(crate) config: HostConfig,
}

/// The assembled dispatch core: registry, deferred loader, dispatcher and
/// wake signal.
///
/// The shell builds one host per session, mints a [`NodeSlot`] per tree
/// node, and re-renders slots whenever the wake signal requests a pass.
/// A new script run swaps in a new set of slots; dropping the old ones
/// cancels their timers and detaches their load subscriptions.
///
/// [`NodeSlot`]: isolate::NodeSlot
pub struct ElementHost {
    shared: Arc<HostShared>,
}

impl ElementHost {
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, HostConfig::default())
    }

    pub fn with_config(registry: Registry, config: HostConfig) -> Self {
        let registry = Arc::new(registry);
        let wake = WakeSignal::new();
        let loader = Arc::new(DeferredLoader::new(wake.clone()));
        let dispatcher = Dispatcher::new(registry.clone(), loader.clone());
        Self {
            shared: Arc::new(HostShared {
                registry,
                loader,
                dispatcher,
                wake,
                config,
            }),
        }
    }

    /// Mint the supervised slot for one node.
    pub fn slot(&self, node: element::ElementNode) -> isolate::NodeSlot {
        isolate::NodeSlot::new(Arc::new(node), self.shared.clone())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.shared.dispatcher
    }

    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    pub fn loader(&self) -> &DeferredLoader {
        &self.shared.loader
    }

    pub fn wake(&self) -> &WakeSignal {
        &self.shared.wake
    }

    /// Stability readout for external verification tooling: the run has
    /// reached its terminal state and no deferred load is in flight.
    pub fn settled(&self, run_state: ScriptRunState) -> bool {
        run_state.is_settled() && !self.shared.loader.any_loading()
    }
}
