//! Run-state policies: whether a node renders at all, and whether its
//! output is outdated relative to the active run.
//!
//! Both are pure functions of the node's descriptor flags, its originating
//! run and the context snapshot; they hold no state of their own.

use crate::context::RenderContext;
use crate::registry::KindFlags;
use crate::run::{RunId, ScriptRunState};

/// Whether a node of the given kind should actively render.
///
/// Most kinds render under every run state. Transient one-shot kinds
/// (celebrations, toasts) play only while their originating run is still
/// the active one and no rerun is pending; re-rendering a stale tree must
/// not re-trigger them.
pub fn should_render(flags: KindFlags, node_run: &RunId, ctx: &RenderContext) -> bool {
    if !flags.contains(KindFlags::TRANSIENT) {
        return true;
    }
    *node_run == ctx.active_run && ctx.run_state != ScriptRunState::RerunRequested
}

/// Whether an already-rendered node is outdated relative to the active run.
///
/// A non-transient node is stale when it comes from a different run and a
/// newer run is active or pending. Stale nodes still render; the caller
/// applies the dimmed treatment. Transient kinds are never dimmed —
/// [`should_render`] hides them outright instead.
pub fn is_stale(flags: KindFlags, node_run: &RunId, ctx: &RenderContext) -> bool {
    if flags.contains(KindFlags::TRANSIENT) {
        return false;
    }
    *node_run != ctx.active_run
        && matches!(
            ctx.run_state,
            ScriptRunState::Running | ScriptRunState::RerunRequested
        )
}
