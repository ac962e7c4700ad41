//! Script-run lifecycle shared between the application shell and the
//! dispatch core.
//!
//! The shell owns the run state and advances it as the upstream script
//! executes; the core only reads snapshots of it through
//! [`RenderContext`](crate::context::RenderContext). The transition to
//! [`ScriptRunState::NotRunning`] doubles as the stability signal external
//! verification tooling waits on, so that contract must stay stable.

use std::fmt;
use std::sync::Arc;

/// Identifier of one execution pass of the upstream script.
///
/// Every node in a tree carries the id of the run that produced it; the
/// context carries the id of the currently active run. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RunId(Arc<str>);

impl RunId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunId({})", self.0)
    }
}

/// Process-wide state of the script run lifecycle.
///
/// Moves forward through `Initial → Running → NotRunning`, with
/// `Running` and `RerunRequested` cycling on repeated reruns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRunState {
    /// No run has started yet.
    Initial,
    /// A run is actively producing nodes.
    Running,
    /// A newer run is pending; the current tree is about to be superseded.
    RerunRequested,
    /// The run finished and the tree has settled.
    NotRunning,
}

impl ScriptRunState {
    /// The externally observable synchronization point: automated
    /// verification tooling treats the tree as settled exactly when the
    /// run state reaches [`ScriptRunState::NotRunning`].
    pub fn is_settled(self) -> bool {
        matches!(self, ScriptRunState::NotRunning)
    }

    /// Whether `next` is a legal successor of this state.
    ///
    /// The shell asserts this when it advances the lifecycle; the core
    /// itself never mutates run state.
    pub fn accepts(self, next: ScriptRunState) -> bool {
        use ScriptRunState::*;
        matches!(
            (self, next),
            (Initial, Running)
                | (Running, RerunRequested)
                | (Running, NotRunning)
                | (RerunRequested, Running)
                | (NotRunning, Running)
                | (NotRunning, RerunRequested)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_only_when_not_running() {
        assert!(ScriptRunState::NotRunning.is_settled());
        assert!(!ScriptRunState::Initial.is_settled());
        assert!(!ScriptRunState::Running.is_settled());
        assert!(!ScriptRunState::RerunRequested.is_settled());
    }

    #[test]
    fn test_forward_transitions() {
        use ScriptRunState::*;
        assert!(Initial.accepts(Running));
        assert!(Running.accepts(NotRunning));
        assert!(Running.accepts(RerunRequested));
        assert!(NotRunning.accepts(Running));
        assert!(NotRunning.accepts(RerunRequested));
    }

    #[test]
    fn test_rerun_cycle() {
        use ScriptRunState::*;
        assert!(Running.accepts(RerunRequested));
        assert!(RerunRequested.accepts(Running));
    }

    #[test]
    fn test_no_backward_transitions() {
        use ScriptRunState::*;
        assert!(!Running.accepts(Initial));
        assert!(!NotRunning.accepts(Initial));
        assert!(!RerunRequested.accepts(NotRunning));
        assert!(!Initial.accepts(NotRunning));
        for state in [Initial, Running, RerunRequested, NotRunning] {
            assert!(!state.accepts(state));
        }
    }

    #[test]
    fn test_run_id_equality() {
        let a = RunId::from("r1");
        let b = RunId::from("r1");
        let c = RunId::from("r2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "r1");
    }
}
