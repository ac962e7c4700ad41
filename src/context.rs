//! Per-pass render context and the collaborator seams it carries.
//!
//! The shell assembles one [`RenderContext`] per render pass and hands it
//! to every node's slot. The bundle is read-only: the core never mutates
//! shared state through it, and any widget value change goes through the
//! widget backend's own synchronization contract, outside this crate.

use std::collections::HashSet;
use std::sync::Arc;

use crate::element::ElementKey;
use crate::run::{RunId, ScriptRunState};

/// Resolves script-layer asset paths to absolute URLs.
pub trait EndpointResolver: Send + Sync {
    fn media_url(&self, path: &str) -> String;
    fn upload_url(&self, file_name: &str) -> String;
}

/// Read access to the widget value store.
///
/// Value storage and synchronization live outside this core; renderers
/// only peek through this seam.
pub trait WidgetBackend: Send + Sync {
    /// Whether a value for this widget is waiting to be synchronized.
    fn has_pending_value(&self, key: &ElementKey) -> bool;
}

/// Transfers user files for the uploader kinds.
pub trait UploadClient: Send + Sync {
    fn endpoint(&self) -> String;
}

/// Registered custom components, by name.
pub trait ComponentCatalog: Send + Sync {
    /// Serving URL of a registered component, `None` if unregistered.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Form metadata forwarded to interactive kinds.
#[derive(Debug, Clone, Default)]
pub struct FormsData {
    /// Ids of forms containing at least one uploader, which changes how
    /// their submit buttons behave while an upload is in flight.
    pub forms_with_uploads: HashSet<String>,
}

impl FormsData {
    pub fn form_has_uploads(&self, form_id: &str) -> bool {
        self.forms_with_uploads.contains(form_id)
    }
}

/// Opaque collaborator handles, shared by reference with every node.
#[derive(Clone)]
pub struct Collaborators {
    pub endpoints: Arc<dyn EndpointResolver>,
    pub widgets: Arc<dyn WidgetBackend>,
    pub uploads: Arc<dyn UploadClient>,
    pub components: Arc<dyn ComponentCatalog>,
    pub forms: Arc<FormsData>,
}

impl Collaborators {
    /// Inert handles for host bootstrap and tests.
    pub fn detached() -> Self {
        Self {
            endpoints: Arc::new(DetachedEndpoints),
            widgets: Arc::new(DetachedWidgets),
            uploads: Arc::new(DetachedUploads),
            components: Arc::new(DetachedComponents),
            forms: Arc::new(FormsData::default()),
        }
    }
}

struct DetachedEndpoints;

impl EndpointResolver for DetachedEndpoints {
    fn media_url(&self, path: &str) -> String {
        path.to_string()
    }

    fn upload_url(&self, file_name: &str) -> String {
        file_name.to_string()
    }
}

struct DetachedWidgets;

impl WidgetBackend for DetachedWidgets {
    fn has_pending_value(&self, _key: &ElementKey) -> bool {
        false
    }
}

struct DetachedUploads;

impl UploadClient for DetachedUploads {
    fn endpoint(&self) -> String {
        String::new()
    }
}

struct DetachedComponents;

impl ComponentCatalog for DetachedComponents {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Read-only bundle for one render pass.
#[derive(Clone)]
pub struct RenderContext {
    /// Layout width available to the tree, always positive.
    pub width: f32,
    /// Suppress fullscreen affordances (embedded surfaces).
    pub disable_fullscreen: bool,
    /// Ancestor-inherited disable flag; ORed with each node's own.
    pub widgets_disabled: bool,
    /// Snapshot of the run lifecycle for this pass.
    pub run_state: ScriptRunState,
    /// Identifier of the currently active run.
    pub active_run: RunId,
    pub collab: Collaborators,
}

impl RenderContext {
    pub fn new(
        width: f32,
        run_state: ScriptRunState,
        active_run: impl Into<RunId>,
        collab: Collaborators,
    ) -> Self {
        debug_assert!(width > 0.0, "render width must be positive");
        Self {
            width,
            disable_fullscreen: false,
            widgets_disabled: false,
            run_state,
            active_run: active_run.into(),
            collab,
        }
    }

    pub fn widgets_disabled(mut self, disabled: bool) -> Self {
        self.widgets_disabled = disabled;
        self
    }

    pub fn disable_fullscreen(mut self, disable: bool) -> Self {
        self.disable_fullscreen = disable;
        self
    }

    /// Effective disabled state: the OR of the ancestor-inherited flag and
    /// the node's own field. Never re-enabled downstream.
    pub fn effective_disabled(&self, node_disabled: bool) -> bool {
        self.widgets_disabled || node_disabled
    }
}
