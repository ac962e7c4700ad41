//! Static mapping from element kind to renderer descriptor.
//!
//! The table is populated once at startup through [`RegistryBuilder`] and
//! read-only afterwards. Registration is injective: a duplicate kind or a
//! shared dispatch target is a configuration error surfaced by
//! [`RegistryBuilder::build`], never at render time.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bitflags::bitflags;

use crate::context::RenderContext;
use crate::element::{ElementKey, ElementKind, ElementNode, ElementPayload};
use crate::error::{LoadError, RegistryError, RenderError};

bitflags! {
    /// Descriptor properties consulted by the policies and the dispatcher.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct KindFlags: u8 {
        /// Needs a stable identity key for state reconciliation across runs.
        const STATEFUL = 0b0000_0001;
        /// One-shot kind: hidden once its run is superseded, never dimmed.
        const TRANSIENT = 0b0000_0010;
        /// Implementation loads on first use instead of linking eagerly.
        const DEFERRED = 0b0000_0100;
        /// Render invocations collapse to the trailing edge of the window.
        const DEBOUNCED = 0b0000_1000;
        /// Nodes of this kind must carry a pre-decoded data payload.
        const REQUIRES_DATA = 0b0001_0000;
    }
}

/// Expected footprint of an element while its implementation loads, so
/// the placeholder holds the slot at roughly the right size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHint {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl SizeHint {
    pub fn height(height: f32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }
}

/// Output a renderer hands back for the shell to mount into its scene.
pub trait ElementView: fmt::Debug + Send + Sync {
    /// Tag of the kind that produced this view.
    fn tag(&self) -> &'static str;
}

/// Props the dispatcher assembles for one render invocation.
pub struct RenderProps<'a> {
    pub ctx: &'a RenderContext,
    /// Effective disabled state, ancestor flag already ORed in.
    pub disabled: bool,
    /// Identity key, present only for stateful kinds.
    pub key: Option<&'a ElementKey>,
}

/// A renderer implementation for one element kind.
///
/// Implementations are opaque leaves to this crate: they interpret the
/// node's payload visually and may fail, but containment of that failure
/// is the isolation wrapper's job, not theirs.
pub trait ElementRenderer: Send + Sync {
    fn render(
        &self,
        node: &ElementNode,
        props: &RenderProps<'_>,
    ) -> Result<Box<dyn ElementView>, RenderError>;
}

/// In-flight deferred load of a renderer implementation.
pub type LoadFuture =
    Pin<Box<dyn Future<Output = Result<Arc<dyn ElementRenderer>, LoadError>> + Send>>;

/// Source of a deferred implementation, fetched at most once per kind.
pub trait RendererLoader: Send + Sync {
    fn load(&self) -> LoadFuture;
}

/// Where a descriptor's implementation comes from.
#[derive(Clone)]
pub enum RendererSource {
    /// Linked in and ready.
    Eager(Arc<dyn ElementRenderer>),
    /// Fetched on first use through the deferred loader.
    Deferred(Arc<dyn RendererLoader>),
}

impl fmt::Debug for RendererSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererSource::Eager(_) => f.write_str("RendererSource::Eager"),
            RendererSource::Deferred(_) => f.write_str("RendererSource::Deferred"),
        }
    }
}

impl RendererSource {
    /// Address of the dispatch target, for the shared-target startup check.
    fn target_addr(&self) -> usize {
        match self {
            RendererSource::Eager(r) => Arc::as_ptr(r) as *const () as usize,
            RendererSource::Deferred(l) => Arc::as_ptr(l) as *const () as usize,
        }
    }
}

/// Second-level dispatch: a payload discriminant that reroutes to an
/// alternate render path without introducing a new top-level tag.
pub struct SecondaryRoute {
    applies: fn(&ElementPayload) -> bool,
    renderer: Arc<dyn ElementRenderer>,
}

impl fmt::Debug for SecondaryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryRoute").finish_non_exhaustive()
    }
}

/// One registered element kind: implementation reference plus the
/// properties the policies and dispatcher consult.
#[derive(Debug)]
pub struct RendererDescriptor {
    kind: ElementKind,
    flags: KindFlags,
    source: RendererSource,
    secondary: Option<SecondaryRoute>,
    placeholder: SizeHint,
}

impl RendererDescriptor {
    pub fn new(kind: ElementKind, flags: KindFlags, source: RendererSource) -> Self {
        Self {
            kind,
            flags,
            source,
            secondary: None,
            placeholder: SizeHint::default(),
        }
    }

    pub fn eager(kind: ElementKind, flags: KindFlags, renderer: Arc<dyn ElementRenderer>) -> Self {
        Self::new(kind, flags, RendererSource::Eager(renderer))
    }

    pub fn deferred(kind: ElementKind, flags: KindFlags, loader: Arc<dyn RendererLoader>) -> Self {
        Self::new(kind, flags, RendererSource::Deferred(loader))
    }

    /// Attach a payload-predicated alternate render path.
    pub fn with_secondary(
        mut self,
        applies: fn(&ElementPayload) -> bool,
        renderer: Arc<dyn ElementRenderer>,
    ) -> Self {
        self.secondary = Some(SecondaryRoute { applies, renderer });
        self
    }

    pub fn with_placeholder(mut self, placeholder: SizeHint) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn flags(&self) -> KindFlags {
        self.flags
    }

    pub fn source(&self) -> &RendererSource {
        &self.source
    }

    pub fn placeholder(&self) -> SizeHint {
        self.placeholder
    }

    /// The secondary renderer, when its predicate matches this payload.
    pub(crate) fn secondary_for(&self, payload: &ElementPayload) -> Option<&Arc<dyn ElementRenderer>> {
        self.secondary
            .as_ref()
            .filter(|route| (route.applies)(payload))
            .map(|route| &route.renderer)
    }
}

/// The dispatch table: element kind → renderer descriptor.
#[derive(Debug)]
pub struct Registry {
    table: HashMap<ElementKind, RendererDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, kind: ElementKind) -> Option<&RendererDescriptor> {
        self.table.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.table.keys().copied()
    }
}

/// Collects descriptors and validates the table once, at startup.
pub struct RegistryBuilder {
    entries: Vec<RendererDescriptor>,
}

impl RegistryBuilder {
    pub fn register(mut self, descriptor: RendererDescriptor) -> Self {
        self.entries.push(descriptor);
        self
    }

    /// Build the table, enforcing injectivity: each kind registered once,
    /// no two kinds sharing a dispatch target.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut table: HashMap<ElementKind, RendererDescriptor> = HashMap::new();
        let mut targets: HashMap<usize, ElementKind> = HashMap::new();

        for descriptor in self.entries {
            let kind = descriptor.kind;
            if table.contains_key(&kind) {
                return Err(RegistryError::DuplicateKind(kind.tag()));
            }
            let addr = descriptor.source.target_addr();
            if let Some(&first) = targets.get(&addr) {
                return Err(RegistryError::SharedTarget {
                    first: first.tag(),
                    second: kind.tag(),
                });
            }
            targets.insert(addr, kind);
            table.insert(kind, descriptor);
        }

        Ok(Registry { table })
    }
}

/// Stock flag assignments for the built-in element catalog.
///
/// Shells registering the standard renderer set start from these; tests
/// assert the interesting subsets stay in sync with the catalog.
pub fn standard_flags(kind: ElementKind) -> KindFlags {
    use ElementKind as K;
    use KindFlags as F;
    match kind {
        K::ArrowDataFrame => F::STATEFUL | F::DEFERRED | F::DEBOUNCED | F::REQUIRES_DATA,
        K::ArrowTable => F::DEFERRED | F::DEBOUNCED | F::REQUIRES_DATA,
        K::ArrowVegaLiteChart => F::STATEFUL | F::DEFERRED | F::DEBOUNCED | F::REQUIRES_DATA,
        K::PlotlyChart | K::DeckGlJsonChart => F::STATEFUL | F::DEFERRED | F::DEBOUNCED,
        K::Balloons | K::Snow | K::Toast => F::TRANSIENT,
        K::Audio | K::Video | K::BokehChart | K::GraphvizChart | K::IFrame | K::ImageList
        | K::Json => F::DEFERRED,
        K::AudioInput | K::CameraInput | K::FileUploader | K::ComponentInstance => {
            F::STATEFUL | F::DEFERRED
        }
        K::Button
        | K::ButtonGroup
        | K::ChatInput
        | K::Checkbox
        | K::ColorPicker
        | K::DateInput
        | K::DownloadButton
        | K::Multiselect
        | K::NumberInput
        | K::Radio
        | K::Selectbox
        | K::Slider
        | K::TextArea
        | K::TextInput
        | K::TimeInput => F::STATEFUL,
        K::Alert
        | K::Code
        | K::DocString
        | K::Empty
        | K::Exception
        | K::Heading
        | K::Html
        | K::LinkButton
        | K::Markdown
        | K::Metric
        | K::PageLink
        | K::Progress
        | K::Skeleton
        | K::Spinner
        | K::Text => F::empty(),
    }
}
