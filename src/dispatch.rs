//! Node-to-renderer dispatch.
//!
//! Resolves a node's tag against the registry, assembles per-kind props
//! (effective disablement, identity keys for stateful kinds), applies
//! second-level payload routing, and invokes the implementation. Errors
//! are typed and returned; containing them is the isolation wrapper's
//! job.

use std::fmt;
use std::sync::Arc;

use crate::context::RenderContext;
use crate::element::{ElementKey, ElementNode};
use crate::error::{DispatchError, RenderError};
use crate::loader::{DeferredLoader, LoadPoll, LoadSubscription};
use crate::registry::{
    ElementRenderer, ElementView, KindFlags, Registry, RenderProps, RendererDescriptor,
    RendererSource,
};

/// Fully dispatched output for one node.
#[derive(Debug)]
pub struct RenderedElement {
    pub tag: &'static str,
    /// Identity key, present only for stateful kinds.
    pub key: Option<ElementKey>,
    /// Effective disabled state the renderer was given.
    pub disabled: bool,
    pub view: Box<dyn ElementView>,
}

/// Outcome of dispatching one node.
pub enum Dispatch {
    /// Rendered to completion.
    Output(RenderedElement),
    /// The kind's deferred implementation is still loading; the caller
    /// suspends this node's slot and re-dispatches after the shared load
    /// settles.
    AwaitingLoad(LoadSubscription),
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Output(element) => f.debug_tuple("Output").field(element).finish(),
            Dispatch::AwaitingLoad(_) => write!(f, "AwaitingLoad"),
        }
    }
}

pub struct Dispatcher {
    registry: Arc<Registry>,
    loader: Arc<DeferredLoader>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, loader: Arc<DeferredLoader>) -> Self {
        Self { registry, loader }
    }

    /// Resolve a node's descriptor, failing with the offending raw tag.
    pub fn resolve(&self, node: &ElementNode) -> Result<&RendererDescriptor, DispatchError> {
        let unrecognized = || DispatchError::UnrecognizedElementKind {
            tag: node.tag().to_string(),
        };
        let kind = node.kind().ok_or_else(unrecognized)?;
        self.registry.get(kind).ok_or_else(unrecognized)
    }

    /// Dispatch a node end to end.
    pub fn dispatch(
        &self,
        node: &ElementNode,
        ctx: &RenderContext,
    ) -> Result<Dispatch, DispatchError> {
        let descriptor = self.resolve(node)?;
        self.dispatch_resolved(descriptor, node, ctx)
    }

    /// Dispatch against an already-resolved descriptor.
    pub(crate) fn dispatch_resolved(
        &self,
        descriptor: &RendererDescriptor,
        node: &ElementNode,
        ctx: &RenderContext,
    ) -> Result<Dispatch, DispatchError> {
        // Second-level dispatch: a payload discriminant can reroute to an
        // alternate path under the same tag.
        if let Some(renderer) = descriptor.secondary_for(node.payload()) {
            let renderer = renderer.clone();
            return Ok(Dispatch::Output(invoke(descriptor, &renderer, node, ctx)?));
        }

        let renderer = match descriptor.source() {
            RendererSource::Eager(renderer) => renderer.clone(),
            RendererSource::Deferred(source) => {
                match self.loader.poll(descriptor.kind(), source) {
                    LoadPoll::Ready(renderer) => renderer,
                    LoadPoll::Pending(sub) => return Ok(Dispatch::AwaitingLoad(sub)),
                    LoadPoll::Failed(err) => {
                        return Err(DispatchError::Load {
                            tag: descriptor.kind().tag(),
                            source: err,
                        })
                    }
                }
            }
        };

        Ok(Dispatch::Output(invoke(descriptor, &renderer, node, ctx)?))
    }
}

/// Assemble props and call one renderer.
fn invoke(
    descriptor: &RendererDescriptor,
    renderer: &Arc<dyn ElementRenderer>,
    node: &ElementNode,
    ctx: &RenderContext,
) -> Result<RenderedElement, DispatchError> {
    let tag = descriptor.kind().tag();
    let flags = descriptor.flags();

    if flags.contains(KindFlags::REQUIRES_DATA) && node.data().is_none() {
        return Err(DispatchError::Render {
            tag,
            source: RenderError::MissingData(tag),
        });
    }
    if node.data().is_some() && !flags.contains(KindFlags::REQUIRES_DATA) {
        log::debug!("`{tag}` node carries a data payload its kind never reads");
    }

    // Display kinds must not receive a key: reusing their slot across
    // runs would otherwise attempt state reconciliation.
    let key = if flags.contains(KindFlags::STATEFUL) {
        match node.key() {
            Some(key) => Some(key),
            None => {
                return Err(DispatchError::Render {
                    tag,
                    source: RenderError::MissingIdentity(tag),
                })
            }
        }
    } else {
        None
    };

    let disabled = ctx.effective_disabled(node.payload().disabled());
    let props = RenderProps {
        ctx,
        disabled,
        key: key.as_ref(),
    };
    let view = renderer
        .render(node, &props)
        .map_err(|source| DispatchError::Render { tag, source })?;

    Ok(RenderedElement {
        tag,
        key,
        disabled,
        view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Collaborators;
    use crate::element::payload::{Button, Checkbox, ElementPayload, Text};
    use crate::element::{DataGrid, ElementKind};
    use crate::registry::SizeHint;
    use crate::run::ScriptRunState;
    use crate::wake::WakeSignal;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StubView(&'static str);

    impl ElementView for StubView {
        fn tag(&self) -> &'static str {
            self.0
        }
    }

    /// Renderer that records the props of each invocation.
    struct RecordingRenderer {
        tag: &'static str,
        seen: Mutex<Vec<(bool, Option<String>)>>,
    }

    impl RecordingRenderer {
        fn new(tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                tag,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl ElementRenderer for RecordingRenderer {
        fn render(
            &self,
            _node: &ElementNode,
            props: &RenderProps<'_>,
        ) -> Result<Box<dyn ElementView>, RenderError> {
            self.seen.lock().unwrap().push((
                props.disabled,
                props.key.map(|k| k.as_str().to_string()),
            ));
            Ok(Box::new(StubView(self.tag)))
        }
    }

    fn ctx(widgets_disabled: bool) -> RenderContext {
        RenderContext::new(
            800.0,
            ScriptRunState::NotRunning,
            "r1",
            Collaborators::detached(),
        )
        .widgets_disabled(widgets_disabled)
    }

    fn dispatcher(registry: Registry) -> Dispatcher {
        let loader = Arc::new(DeferredLoader::new(WakeSignal::new()));
        Dispatcher::new(Arc::new(registry), loader)
    }

    fn button_node(disabled: bool) -> ElementNode {
        ElementNode::new(
            "r1",
            ElementPayload::Button(Button {
                label: "Run".into(),
                disabled,
                ..Button::default()
            }),
        )
        .with_id("b1")
    }

    #[test]
    fn test_unknown_tag_fails_with_raw_tag() {
        let registry = Registry::builder().build().unwrap();
        let dispatcher = dispatcher(registry);
        let node = ElementNode::new(
            "r1",
            ElementPayload::Unknown {
                tag: "foobar".into(),
            },
        );
        let err = dispatcher.dispatch(&node, &ctx(false)).unwrap_err();
        match err {
            DispatchError::UnrecognizedElementKind { tag } => assert_eq!(tag, "foobar"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_kind_fails() {
        let registry = Registry::builder().build().unwrap();
        let dispatcher = dispatcher(registry);
        let node = ElementNode::new(
            "r1",
            ElementPayload::Text(Text {
                body: "hi".into(),
                help: None,
            }),
        );
        let err = dispatcher.dispatch(&node, &ctx(false)).unwrap_err();
        match err {
            DispatchError::UnrecognizedElementKind { tag } => assert_eq!(tag, "text"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_effective_disabled_is_or_of_both_flags() {
        let renderer = RecordingRenderer::new("button");
        let registry = Registry::builder()
            .register(RendererDescriptor::eager(
                ElementKind::Button,
                KindFlags::STATEFUL,
                renderer.clone(),
            ))
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        for (ancestor, own, expected) in [
            (false, false, false),
            (false, true, true),
            (true, false, true),
            (true, true, true),
        ] {
            dispatcher
                .dispatch(&button_node(own), &ctx(ancestor))
                .unwrap();
            let (disabled, _) = renderer.seen.lock().unwrap().pop().unwrap();
            assert_eq!(disabled, expected, "ancestor={ancestor} own={own}");
        }
    }

    #[test]
    fn test_stateful_kind_gets_identity_key() {
        let renderer = RecordingRenderer::new("button");
        let registry = Registry::builder()
            .register(RendererDescriptor::eager(
                ElementKind::Button,
                KindFlags::STATEFUL,
                renderer.clone(),
            ))
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        let Dispatch::Output(element) =
            dispatcher.dispatch(&button_node(false), &ctx(false)).unwrap()
        else {
            panic!("expected output");
        };
        assert_eq!(element.key.as_ref().unwrap().as_str(), "b1");
        let (_, key) = renderer.seen.lock().unwrap().pop().unwrap();
        assert_eq!(key.as_deref(), Some("b1"));
    }

    #[test]
    fn test_display_kind_never_gets_key() {
        let renderer = RecordingRenderer::new("text");
        let registry = Registry::builder()
            .register(RendererDescriptor::eager(
                ElementKind::Text,
                KindFlags::empty(),
                renderer.clone(),
            ))
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        // Even a display node that happens to carry an id gets no key.
        let node = ElementNode::new(
            "r1",
            ElementPayload::Text(Text {
                body: "hi".into(),
                help: None,
            }),
        )
        .with_id("t1");
        let Dispatch::Output(element) = dispatcher.dispatch(&node, &ctx(false)).unwrap() else {
            panic!("expected output");
        };
        assert!(element.key.is_none());
    }

    #[test]
    fn test_stateful_without_id_is_contained_failure() {
        let registry = Registry::builder()
            .register(RendererDescriptor::eager(
                ElementKind::Checkbox,
                KindFlags::STATEFUL,
                RecordingRenderer::new("checkbox"),
            ))
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        let node = ElementNode::new("r1", ElementPayload::Checkbox(Checkbox::default()));
        let err = dispatcher.dispatch(&node, &ctx(false)).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Render {
                tag: "checkbox",
                source: RenderError::MissingIdentity(_),
            }
        ));
    }

    #[test]
    fn test_missing_data_payload_is_contained_failure() {
        let registry = Registry::builder()
            .register(RendererDescriptor::eager(
                ElementKind::ArrowTable,
                KindFlags::REQUIRES_DATA,
                RecordingRenderer::new("arrowTable"),
            ))
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        let bare = ElementNode::new("r1", ElementPayload::ArrowTable(Default::default()));
        let err = dispatcher.dispatch(&bare, &ctx(false)).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Render {
                tag: "arrowTable",
                source: RenderError::MissingData(_),
            }
        ));

        let with_data = ElementNode::new("r1", ElementPayload::ArrowTable(Default::default()))
            .with_data(DataGrid::new(vec!["a".into()], 2));
        assert!(dispatcher.dispatch(&with_data, &ctx(false)).is_ok());
    }

    #[test]
    fn test_submit_button_routes_to_secondary_path() {
        let standard = RecordingRenderer::new("button");
        let submit = RecordingRenderer::new("button-form-submit");
        let registry = Registry::builder()
            .register(
                RendererDescriptor::eager(
                    ElementKind::Button,
                    KindFlags::STATEFUL,
                    standard.clone(),
                )
                .with_secondary(
                    |payload| {
                        matches!(payload, ElementPayload::Button(b) if b.is_form_submitter)
                    },
                    submit.clone(),
                ),
            )
            .build()
            .unwrap();
        let dispatcher = dispatcher(registry);

        let plain = button_node(false);
        let Dispatch::Output(element) = dispatcher.dispatch(&plain, &ctx(false)).unwrap() else {
            panic!("expected output");
        };
        assert_eq!(element.view.tag(), "button");

        let form = ElementNode::new(
            "r1",
            ElementPayload::Button(Button {
                label: "Submit".into(),
                is_form_submitter: true,
                form_id: Some("checkout".into()),
                ..Button::default()
            }),
        )
        .with_id("b2");
        let Dispatch::Output(element) = dispatcher.dispatch(&form, &ctx(false)).unwrap() else {
            panic!("expected output");
        };
        assert_eq!(element.view.tag(), "button-form-submit");
        assert_eq!(standard.seen.lock().unwrap().len(), 1);
        assert_eq!(submit.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_each_tag_dispatches_to_its_own_descriptor() {
        let kinds = [
            (ElementKind::Text, "text"),
            (ElementKind::Markdown, "markdown"),
            (ElementKind::Progress, "progress"),
        ];
        let mut builder = Registry::builder();
        for (kind, tag) in kinds {
            builder = builder.register(RendererDescriptor::eager(
                kind,
                KindFlags::empty(),
                RecordingRenderer::new(tag),
            ));
        }
        let dispatcher = dispatcher(builder.build().unwrap());

        let nodes = [
            ElementNode::new(
                "r1",
                ElementPayload::Text(Text {
                    body: "a".into(),
                    help: None,
                }),
            ),
            ElementNode::new("r1", ElementPayload::Markdown(Default::default())),
            ElementNode::new("r1", ElementPayload::Progress(Default::default())),
        ];
        for (node, (_, tag)) in nodes.iter().zip(kinds) {
            let Dispatch::Output(element) = dispatcher.dispatch(node, &ctx(false)).unwrap()
            else {
                panic!("expected output");
            };
            assert_eq!(element.view.tag(), tag);
        }
    }

    #[test]
    fn test_placeholder_hint_carried_by_descriptor() {
        let registry = Registry::builder()
            .register(
                RendererDescriptor::eager(
                    ElementKind::Text,
                    KindFlags::empty(),
                    RecordingRenderer::new("text"),
                )
                .with_placeholder(SizeHint::height(240.0)),
            )
            .build()
            .unwrap();
        let descriptor = registry.get(ElementKind::Text).unwrap();
        assert_eq!(descriptor.placeholder().height, Some(240.0));
    }
}
