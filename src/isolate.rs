//! Per-node isolation: error containment, deferred-load suspension and
//! render-rate limiting composed around the dispatcher.
//!
//! Every node of the tree renders through its own [`NodeSlot`], so one
//! node's panic, load failure or pending load never reaches a sibling or
//! the traversal caller. The slot owns the node's debounce timer and load
//! subscription; both die with the slot.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::context::RenderContext;
use crate::debounce::Debouncer;
use crate::dispatch::{Dispatch, RenderedElement};
use crate::element::ElementNode;
use crate::error::NodeFailure;
use crate::loader::LoadSubscription;
use crate::policy;
use crate::registry::{KindFlags, SizeHint};
use crate::HostShared;

/// Terminal outcome of rendering one node's slot.
///
/// Never an error: every path ends in a successful render, a placeholder,
/// a hidden slot, or a contained fallback.
#[derive(Debug)]
pub enum RenderOutput {
    /// Successful dispatch. `stale` asks the caller for the dimmed visual
    /// treatment; the content itself is current as of the node's run.
    Rendered {
        element: RenderedElement,
        stale: bool,
    },
    /// The kind's implementation is still loading; show a lightweight
    /// placeholder sized to the eventual element.
    Pending(SizeHint),
    /// Enablement policy suppressed the node outright.
    Hidden,
    /// Contained failure: an inline error affordance in this slot only.
    Failed(NodeFailure),
}

impl RenderOutput {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutput::Rendered { .. })
    }
}

/// Supervised render slot for one node of the tree.
///
/// Created by [`ElementHost::slot`](crate::ElementHost::slot); dropped
/// when the node leaves the tree. Dropping cancels the slot's debounce
/// timer and detaches its load subscription without touching the shared
/// load.
pub struct NodeSlot {
    node: Arc<ElementNode>,
    shared: Arc<HostShared>,
    latest: Arc<Mutex<Option<Arc<RenderOutput>>>>,
    load_sub: Arc<Mutex<Option<LoadSubscription>>>,
    debounce: Option<Debouncer<RenderContext>>,
}

impl NodeSlot {
    pub(crate) fn new(node: Arc<ElementNode>, shared: Arc<HostShared>) -> Self {
        let latest: Arc<Mutex<Option<Arc<RenderOutput>>>> = Arc::new(Mutex::new(None));
        let load_sub: Arc<Mutex<Option<LoadSubscription>>> = Arc::new(Mutex::new(None));

        let debounce = if is_debounced(&node, &shared) {
            let node = node.clone();
            let shared_in = shared.clone();
            let latest_in = latest.clone();
            let load_sub_in = load_sub.clone();
            Some(Debouncer::new(
                shared.config.collapse_window,
                move |ctx: RenderContext| {
                    let out = Arc::new(render_contained(&shared_in, &node, &load_sub_in, &ctx));
                    *latest_in.lock().unwrap() = Some(out);
                    shared_in.wake.request();
                },
            ))
        } else {
            None
        };

        Self {
            node,
            shared,
            latest,
            load_sub,
            debounce,
        }
    }

    pub fn node(&self) -> &ElementNode {
        &self.node
    }

    /// Most recent completed output, if any pass has finished.
    pub fn latest(&self) -> Option<Arc<RenderOutput>> {
        self.latest.lock().unwrap().clone()
    }

    /// Render this node for the given pass.
    ///
    /// For debounced kinds the invocation is recorded and collapses into
    /// the burst's trailing edge; the previous output (or a placeholder)
    /// is returned meanwhile and a wake is requested when the real render
    /// lands.
    pub fn render(&self, ctx: &RenderContext) -> Arc<RenderOutput> {
        if let Some(debounce) = &self.debounce {
            debounce.trigger(ctx.clone());
            return self
                .latest()
                .unwrap_or_else(|| Arc::new(RenderOutput::Pending(self.placeholder())));
        }

        let out = Arc::new(render_contained(
            &self.shared,
            &self.node,
            &self.load_sub,
            ctx,
        ));
        *self.latest.lock().unwrap() = Some(out.clone());
        out
    }

    fn placeholder(&self) -> SizeHint {
        self.node
            .kind()
            .and_then(|kind| self.shared.registry.get(kind))
            .map(|descriptor| descriptor.placeholder())
            .unwrap_or_default()
    }
}

fn is_debounced(node: &ElementNode, shared: &HostShared) -> bool {
    node.kind()
        .and_then(|kind| shared.registry.get(kind))
        .map(|descriptor| descriptor.flags().contains(KindFlags::DEBOUNCED))
        .unwrap_or(false)
}

/// One contained render: policies, dispatch, and both failure channels.
fn render_contained(
    shared: &HostShared,
    node: &ElementNode,
    load_sub: &Mutex<Option<LoadSubscription>>,
    ctx: &RenderContext,
) -> RenderOutput {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        render_node(shared, node, load_sub, ctx)
    })) {
        Ok(out) => out,
        Err(payload) => {
            let message = panic_message(payload);
            log::error!("renderer for `{}` panicked: {message}", node.tag());
            RenderOutput::Failed(NodeFailure::panic(node.tag(), message))
        }
    }
}

fn render_node(
    shared: &HostShared,
    node: &ElementNode,
    load_sub: &Mutex<Option<LoadSubscription>>,
    ctx: &RenderContext,
) -> RenderOutput {
    let descriptor = match shared.dispatcher.resolve(node) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            log::warn!("{err}");
            return RenderOutput::Failed(NodeFailure::from(&err));
        }
    };

    let flags = descriptor.flags();
    if !policy::should_render(flags, node.run_id(), ctx) {
        return RenderOutput::Hidden;
    }
    let stale = policy::is_stale(flags, node.run_id(), ctx);

    match shared.dispatcher.dispatch_resolved(descriptor, node, ctx) {
        Ok(Dispatch::Output(element)) => {
            *load_sub.lock().unwrap() = None;
            RenderOutput::Rendered { element, stale }
        }
        Ok(Dispatch::AwaitingLoad(sub)) => {
            *load_sub.lock().unwrap() = Some(sub);
            RenderOutput::Pending(descriptor.placeholder())
        }
        Err(err) => {
            log::error!("node `{}` failed to render: {err}", node.tag());
            RenderOutput::Failed(NodeFailure::from(&err))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_string()
    }
}
