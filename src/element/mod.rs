//! The element model: one node per tree leaf, one kind per node.
//!
//! Nodes are produced by the upstream decode layer once per script run and
//! are immutable afterwards; a new run supersedes the whole tree rather
//! than patching it. This module owns the closed set of element kinds,
//! node identity, and the pre-decoded data payload attached to the
//! table/chart kinds.

pub mod payload;

use std::fmt;
use std::sync::Arc;

use crate::run::RunId;

pub use payload::ElementPayload;

/// Closed enumeration of the element kinds this build dispatches.
///
/// The variant is the dispatch tag; [`ElementKind::tag`] is its wire
/// spelling. Wire tags outside this set reach the core as
/// [`ElementPayload::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Alert,
    ArrowDataFrame,
    ArrowTable,
    ArrowVegaLiteChart,
    Audio,
    AudioInput,
    Balloons,
    BokehChart,
    Button,
    ButtonGroup,
    CameraInput,
    ChatInput,
    Checkbox,
    Code,
    ColorPicker,
    ComponentInstance,
    DateInput,
    DeckGlJsonChart,
    DocString,
    DownloadButton,
    Empty,
    Exception,
    FileUploader,
    GraphvizChart,
    Heading,
    Html,
    IFrame,
    ImageList,
    Json,
    LinkButton,
    Markdown,
    Metric,
    Multiselect,
    NumberInput,
    PageLink,
    PlotlyChart,
    Progress,
    Radio,
    Selectbox,
    Skeleton,
    Slider,
    Snow,
    Spinner,
    Text,
    TextArea,
    TextInput,
    TimeInput,
    Toast,
    Video,
}

impl ElementKind {
    /// Every kind, in tag order. Registry completeness and tag-uniqueness
    /// checks iterate this.
    pub const ALL: [ElementKind; 49] = [
        ElementKind::Alert,
        ElementKind::ArrowDataFrame,
        ElementKind::ArrowTable,
        ElementKind::ArrowVegaLiteChart,
        ElementKind::Audio,
        ElementKind::AudioInput,
        ElementKind::Balloons,
        ElementKind::BokehChart,
        ElementKind::Button,
        ElementKind::ButtonGroup,
        ElementKind::CameraInput,
        ElementKind::ChatInput,
        ElementKind::Checkbox,
        ElementKind::Code,
        ElementKind::ColorPicker,
        ElementKind::ComponentInstance,
        ElementKind::DateInput,
        ElementKind::DeckGlJsonChart,
        ElementKind::DocString,
        ElementKind::DownloadButton,
        ElementKind::Empty,
        ElementKind::Exception,
        ElementKind::FileUploader,
        ElementKind::GraphvizChart,
        ElementKind::Heading,
        ElementKind::Html,
        ElementKind::IFrame,
        ElementKind::ImageList,
        ElementKind::Json,
        ElementKind::LinkButton,
        ElementKind::Markdown,
        ElementKind::Metric,
        ElementKind::Multiselect,
        ElementKind::NumberInput,
        ElementKind::PageLink,
        ElementKind::PlotlyChart,
        ElementKind::Progress,
        ElementKind::Radio,
        ElementKind::Selectbox,
        ElementKind::Skeleton,
        ElementKind::Slider,
        ElementKind::Snow,
        ElementKind::Spinner,
        ElementKind::Text,
        ElementKind::TextArea,
        ElementKind::TextInput,
        ElementKind::TimeInput,
        ElementKind::Toast,
        ElementKind::Video,
    ];

    /// The wire spelling of this kind's tag.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Alert => "alert",
            ElementKind::ArrowDataFrame => "arrowDataFrame",
            ElementKind::ArrowTable => "arrowTable",
            ElementKind::ArrowVegaLiteChart => "arrowVegaLiteChart",
            ElementKind::Audio => "audio",
            ElementKind::AudioInput => "audioInput",
            ElementKind::Balloons => "balloons",
            ElementKind::BokehChart => "bokehChart",
            ElementKind::Button => "button",
            ElementKind::ButtonGroup => "buttonGroup",
            ElementKind::CameraInput => "cameraInput",
            ElementKind::ChatInput => "chatInput",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Code => "code",
            ElementKind::ColorPicker => "colorPicker",
            ElementKind::ComponentInstance => "componentInstance",
            ElementKind::DateInput => "dateInput",
            ElementKind::DeckGlJsonChart => "deckGlJsonChart",
            ElementKind::DocString => "docString",
            ElementKind::DownloadButton => "downloadButton",
            ElementKind::Empty => "empty",
            ElementKind::Exception => "exception",
            ElementKind::FileUploader => "fileUploader",
            ElementKind::GraphvizChart => "graphvizChart",
            ElementKind::Heading => "heading",
            ElementKind::Html => "html",
            ElementKind::IFrame => "iframe",
            ElementKind::ImageList => "imgs",
            ElementKind::Json => "json",
            ElementKind::LinkButton => "linkButton",
            ElementKind::Markdown => "markdown",
            ElementKind::Metric => "metric",
            ElementKind::Multiselect => "multiselect",
            ElementKind::NumberInput => "numberInput",
            ElementKind::PageLink => "pageLink",
            ElementKind::PlotlyChart => "plotlyChart",
            ElementKind::Progress => "progress",
            ElementKind::Radio => "radio",
            ElementKind::Selectbox => "selectbox",
            ElementKind::Skeleton => "skeleton",
            ElementKind::Slider => "slider",
            ElementKind::Snow => "snow",
            ElementKind::Spinner => "spinner",
            ElementKind::Text => "text",
            ElementKind::TextArea => "textArea",
            ElementKind::TextInput => "textInput",
            ElementKind::TimeInput => "timeInput",
            ElementKind::Toast => "toast",
            ElementKind::Video => "video",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Stable wire-level identity of a stateful (widget) node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElementId(Arc<str>);

impl ElementId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// Render identity key for stateful reconciliation across runs.
///
/// Derived from the node's [`ElementId`]; the same widget keeps the same
/// key in consecutive runs so its state survives the tree swap. Display
/// kinds never get one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElementKey(Arc<str>);

impl ElementKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ElementId> for ElementKey {
    fn from(id: &ElementId) -> Self {
        Self(id.0.clone())
    }
}

impl fmt::Debug for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementKey({})", self.0)
    }
}

/// Pre-decoded tabular structure for the kinds that require one.
///
/// Computed once by the decode layer and attached to the node immutably;
/// presence is fully determined by the node's kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataGrid {
    pub columns: Vec<String>,
    pub num_rows: usize,
}

impl DataGrid {
    pub fn new(columns: Vec<String>, num_rows: usize) -> Self {
        Self { columns, num_rows }
    }
}

/// One leaf of the render tree for one script run.
///
/// Built once by the decode layer, never mutated; the next run's tree
/// replaces it wholesale.
#[derive(Debug, Clone)]
pub struct ElementNode {
    id: Option<ElementId>,
    run_id: RunId,
    payload: ElementPayload,
    data: Option<Arc<DataGrid>>,
}

impl ElementNode {
    pub fn new(run_id: impl Into<RunId>, payload: ElementPayload) -> Self {
        Self {
            id: None,
            run_id: run_id.into(),
            payload,
            data: None,
        }
    }

    /// Attach the stable identity of a stateful node.
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach the pre-decoded data payload.
    pub fn with_data(mut self, data: DataGrid) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn id(&self) -> Option<&ElementId> {
        self.id.as_ref()
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn payload(&self) -> &ElementPayload {
        &self.payload
    }

    pub fn data(&self) -> Option<&Arc<DataGrid>> {
        self.data.as_ref()
    }

    pub fn kind(&self) -> Option<ElementKind> {
        self.payload.kind()
    }

    pub fn tag(&self) -> &str {
        self.payload.tag()
    }

    /// Reconciliation key, present iff the node carries an id.
    pub fn key(&self) -> Option<ElementKey> {
        self.id.as_ref().map(ElementKey::from)
    }
}
