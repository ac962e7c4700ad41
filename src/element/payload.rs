//! Per-kind payload structs and the tagged union over them.
//!
//! One struct per element kind, carrying the fields the dispatch core and
//! its policies observe. The upstream decode layer populates exactly one
//! variant per node; visual interpretation of the fields belongs to the
//! renderer implementations, not to this crate.

use super::ElementKind;

/// Severity of an alert box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFormat {
    Error,
    Warning,
    #[default]
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alert {
    pub body: String,
    pub format: AlertFormat,
    pub icon: Option<String>,
}

/// Editable data grid backed by a pre-decoded [`DataGrid`](super::DataGrid).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrowDataFrame {
    pub height: Option<f32>,
    pub use_container_width: bool,
    pub editable: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrowTable {
    pub use_container_width: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrowVegaLiteChart {
    pub spec: String,
    pub use_container_width: bool,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Audio {
    pub url: String,
    pub start_time: f64,
    pub autoplay: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioInput {
    pub label: String,
    pub disabled: bool,
}

/// One-shot celebration overlay. Replayed never, rendered once per run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Balloons {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BokehChart {
    pub figure: String,
    pub use_container_width: bool,
}

/// Interactive button. `is_form_submitter` routes to the form-submit
/// render path without introducing a new top-level tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
    pub is_form_submitter: bool,
    pub form_id: Option<String>,
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonGroup {
    pub options: Vec<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraInput {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatInput {
    pub placeholder: String,
    pub max_chars: Option<u32>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Checkbox {
    pub label: String,
    pub default: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Code {
    pub body: String,
    pub language: Option<String>,
    pub show_line_numbers: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorPicker {
    pub label: String,
    pub default: String,
    pub disabled: bool,
}

/// Instance of a custom component served from the component catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentInstance {
    pub name: String,
    pub url: Option<String>,
    pub json_args: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateInput {
    pub label: String,
    pub default: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeckGlJsonChart {
    pub json: String,
    pub tooltip: Option<String>,
    pub use_container_width: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocString {
    pub name: Option<String>,
    pub doc_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadButton {
    pub label: String,
    pub file_name: String,
    pub url: String,
    pub disabled: bool,
}

/// Placeholder slot that renders nothing but keeps its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Exception {
    pub exception_type: String,
    pub message: String,
    pub stack_trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileUploader {
    pub label: String,
    pub allowed_types: Vec<String>,
    pub multiple_files: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphvizChart {
    pub dot: String,
    pub use_container_width: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Heading {
    pub body: String,
    /// 1-based heading level, `1` rendering largest.
    pub level: u8,
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Html {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IFrame {
    pub src: Option<String>,
    pub srcdoc: Option<String>,
    pub height: f32,
    pub scrolling: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageList {
    pub urls: Vec<String>,
    pub captions: Vec<String>,
    pub width: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Json {
    pub body: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Markdown {
    pub body: String,
    pub allow_html: bool,
    pub is_caption: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metric {
    pub label: String,
    pub body: String,
    pub delta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Multiselect {
    pub label: String,
    pub options: Vec<String>,
    pub default: Vec<u32>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberInput {
    pub label: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLink {
    pub page: String,
    pub label: String,
    pub icon: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotlyChart {
    pub figure: String,
    pub use_container_width: bool,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Progress {
    /// Completion in `[0, 1]`.
    pub value: f32,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Radio {
    pub label: String,
    pub options: Vec<String>,
    pub default: Option<u32>,
    pub horizontal: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selectbox {
    pub label: String,
    pub options: Vec<String>,
    pub default: Option<u32>,
    pub disabled: bool,
}

/// Dimensioned loading placeholder emitted by the script layer itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    pub height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slider {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: Vec<f64>,
    pub disabled: bool,
}

/// One-shot celebration overlay, same lifecycle as [`Balloons`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snow {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spinner {
    pub text: String,
    pub cache: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub body: String,
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextArea {
    pub label: String,
    pub default: Option<String>,
    pub max_chars: Option<u32>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInput {
    pub label: String,
    pub default: Option<String>,
    pub max_chars: Option<u32>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeInput {
    pub label: String,
    pub default: Option<String>,
    pub disabled: bool,
}

/// Transient notification shown outside the tree flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Toast {
    pub body: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Video {
    pub url: String,
    pub start_time: f64,
    pub muted: bool,
}

/// The tagged union a node carries: exactly one variant is populated,
/// selected by the wire-level `type` tag.
///
/// `Unknown` is the forward-compatibility escape hatch for tags newer than
/// this build; dispatching one fails with an unrecognized-kind error that
/// is contained to the node.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPayload {
    Alert(Alert),
    ArrowDataFrame(ArrowDataFrame),
    ArrowTable(ArrowTable),
    ArrowVegaLiteChart(ArrowVegaLiteChart),
    Audio(Audio),
    AudioInput(AudioInput),
    Balloons(Balloons),
    BokehChart(BokehChart),
    Button(Button),
    ButtonGroup(ButtonGroup),
    CameraInput(CameraInput),
    ChatInput(ChatInput),
    Checkbox(Checkbox),
    Code(Code),
    ColorPicker(ColorPicker),
    ComponentInstance(ComponentInstance),
    DateInput(DateInput),
    DeckGlJsonChart(DeckGlJsonChart),
    DocString(DocString),
    DownloadButton(DownloadButton),
    Empty(Empty),
    Exception(Exception),
    FileUploader(FileUploader),
    GraphvizChart(GraphvizChart),
    Heading(Heading),
    Html(Html),
    IFrame(IFrame),
    ImageList(ImageList),
    Json(Json),
    LinkButton(LinkButton),
    Markdown(Markdown),
    Metric(Metric),
    Multiselect(Multiselect),
    NumberInput(NumberInput),
    PageLink(PageLink),
    PlotlyChart(PlotlyChart),
    Progress(Progress),
    Radio(Radio),
    Selectbox(Selectbox),
    Skeleton(Skeleton),
    Slider(Slider),
    Snow(Snow),
    Spinner(Spinner),
    Text(Text),
    TextArea(TextArea),
    TextInput(TextInput),
    TimeInput(TimeInput),
    Toast(Toast),
    Video(Video),
    /// A wire tag this build does not know.
    Unknown { tag: String },
}

impl ElementPayload {
    /// The kind this payload dispatches as, `None` for [`Unknown`] tags.
    ///
    /// [`Unknown`]: ElementPayload::Unknown
    pub fn kind(&self) -> Option<ElementKind> {
        use ElementPayload as P;
        Some(match self {
            P::Alert(_) => ElementKind::Alert,
            P::ArrowDataFrame(_) => ElementKind::ArrowDataFrame,
            P::ArrowTable(_) => ElementKind::ArrowTable,
            P::ArrowVegaLiteChart(_) => ElementKind::ArrowVegaLiteChart,
            P::Audio(_) => ElementKind::Audio,
            P::AudioInput(_) => ElementKind::AudioInput,
            P::Balloons(_) => ElementKind::Balloons,
            P::BokehChart(_) => ElementKind::BokehChart,
            P::Button(_) => ElementKind::Button,
            P::ButtonGroup(_) => ElementKind::ButtonGroup,
            P::CameraInput(_) => ElementKind::CameraInput,
            P::ChatInput(_) => ElementKind::ChatInput,
            P::Checkbox(_) => ElementKind::Checkbox,
            P::Code(_) => ElementKind::Code,
            P::ColorPicker(_) => ElementKind::ColorPicker,
            P::ComponentInstance(_) => ElementKind::ComponentInstance,
            P::DateInput(_) => ElementKind::DateInput,
            P::DeckGlJsonChart(_) => ElementKind::DeckGlJsonChart,
            P::DocString(_) => ElementKind::DocString,
            P::DownloadButton(_) => ElementKind::DownloadButton,
            P::Empty(_) => ElementKind::Empty,
            P::Exception(_) => ElementKind::Exception,
            P::FileUploader(_) => ElementKind::FileUploader,
            P::GraphvizChart(_) => ElementKind::GraphvizChart,
            P::Heading(_) => ElementKind::Heading,
            P::Html(_) => ElementKind::Html,
            P::IFrame(_) => ElementKind::IFrame,
            P::ImageList(_) => ElementKind::ImageList,
            P::Json(_) => ElementKind::Json,
            P::LinkButton(_) => ElementKind::LinkButton,
            P::Markdown(_) => ElementKind::Markdown,
            P::Metric(_) => ElementKind::Metric,
            P::Multiselect(_) => ElementKind::Multiselect,
            P::NumberInput(_) => ElementKind::NumberInput,
            P::PageLink(_) => ElementKind::PageLink,
            P::PlotlyChart(_) => ElementKind::PlotlyChart,
            P::Progress(_) => ElementKind::Progress,
            P::Radio(_) => ElementKind::Radio,
            P::Selectbox(_) => ElementKind::Selectbox,
            P::Skeleton(_) => ElementKind::Skeleton,
            P::Slider(_) => ElementKind::Slider,
            P::Snow(_) => ElementKind::Snow,
            P::Spinner(_) => ElementKind::Spinner,
            P::Text(_) => ElementKind::Text,
            P::TextArea(_) => ElementKind::TextArea,
            P::TextInput(_) => ElementKind::TextInput,
            P::TimeInput(_) => ElementKind::TimeInput,
            P::Toast(_) => ElementKind::Toast,
            P::Video(_) => ElementKind::Video,
            P::Unknown { .. } => return None,
        })
    }

    /// The wire tag, including unknown ones.
    pub fn tag(&self) -> &str {
        match self {
            ElementPayload::Unknown { tag } => tag,
            known => known
                .kind()
                .expect("non-unknown payload always has a kind")
                .tag(),
        }
    }

    /// The node's own disabled field, `false` for kinds without one.
    ///
    /// Effective disablement additionally ORs in the ancestor-inherited
    /// flag from the render context; see
    /// [`RenderContext::effective_disabled`](crate::context::RenderContext::effective_disabled).
    pub fn disabled(&self) -> bool {
        use ElementPayload as P;
        match self {
            P::ArrowDataFrame(p) => p.disabled,
            P::AudioInput(p) => p.disabled,
            P::Button(p) => p.disabled,
            P::ButtonGroup(p) => p.disabled,
            P::CameraInput(p) => p.disabled,
            P::ChatInput(p) => p.disabled,
            P::Checkbox(p) => p.disabled,
            P::ColorPicker(p) => p.disabled,
            P::DateInput(p) => p.disabled,
            P::DownloadButton(p) => p.disabled,
            P::FileUploader(p) => p.disabled,
            P::LinkButton(p) => p.disabled,
            P::Multiselect(p) => p.disabled,
            P::NumberInput(p) => p.disabled,
            P::PageLink(p) => p.disabled,
            P::Radio(p) => p.disabled,
            P::Selectbox(p) => p.disabled,
            P::Slider(p) => p.disabled,
            P::TextArea(p) => p.disabled,
            P::TextInput(p) => p.disabled,
            P::TimeInput(p) => p.disabled,
            _ => false,
        }
    }
}
