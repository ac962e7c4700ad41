//! Error taxonomy for the dispatch core.
//!
//! Everything here is contained at the node-slot boundary: these types
//! travel between the registry, dispatcher and isolation wrapper, but the
//! tree traversal caller only ever sees a
//! [`RenderOutput`](crate::isolate::RenderOutput).

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for foreign renderer failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure inside a resolved kind's render path.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer-reported failure.
    #[error("{0}")]
    Message(String),

    /// The kind requires a pre-decoded data payload the node lacks.
    #[error("missing pre-decoded data for `{0}`")]
    MissingData(&'static str),

    /// A stateful kind was dispatched without a stable element id.
    #[error("stateful kind `{0}` has no element id")]
    MissingIdentity(&'static str),

    /// Anything a foreign renderer implementation raised.
    #[error("renderer error")]
    Renderer(#[source] BoxError),
}

impl RenderError {
    pub fn msg(message: impl Into<String>) -> Self {
        RenderError::Message(message.into())
    }
}

impl From<BoxError> for RenderError {
    fn from(err: BoxError) -> Self {
        RenderError::Renderer(err)
    }
}

/// A deferred implementation failed to resolve.
///
/// Cloned into every node of the kind: the failure is cached so later
/// nodes fail fast instead of re-attempting the load.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct LoadError {
    message: Arc<str>,
}

impl LoadError {
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by dispatching a single node.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The node's tag is not present in the registry. Carries the raw tag
    /// for diagnostics; this is a configuration or version mismatch, so
    /// there is no retry.
    #[error("unrecognized element kind `{tag}`")]
    UnrecognizedElementKind { tag: String },

    /// The kind's renderer (or a dispatch precondition) failed.
    #[error("renderer for `{tag}` failed: {source}")]
    Render {
        tag: &'static str,
        #[source]
        source: RenderError,
    },

    /// The kind's deferred implementation failed to load.
    #[error("implementation for `{tag}` failed to load: {source}")]
    Load {
        tag: &'static str,
        #[source]
        source: LoadError,
    },
}

/// Registry configuration errors, caught when the table is built rather
/// than at render time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("element kind `{0}` registered twice")]
    DuplicateKind(&'static str),

    #[error("element kinds `{first}` and `{second}` share a dispatch target")]
    SharedTarget {
        first: &'static str,
        second: &'static str,
    },
}

/// Contained failure shown as an inline error affordance in one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    /// Raw tag of the failing node.
    pub tag: String,
    /// Human-readable diagnostic.
    pub message: String,
}

impl NodeFailure {
    pub(crate) fn panic(tag: &str, message: String) -> Self {
        Self {
            tag: tag.to_string(),
            message,
        }
    }
}

impl From<&DispatchError> for NodeFailure {
    fn from(err: &DispatchError) -> Self {
        let tag = match err {
            DispatchError::UnrecognizedElementKind { tag } => tag.clone(),
            DispatchError::Render { tag, .. } | DispatchError::Load { tag, .. } => {
                (*tag).to_string()
            }
        };
        Self {
            tag,
            message: err.to_string(),
        }
    }
}
