use crate::ctx::ReconcileCtx;
use crate::error::ReconcileError;
use crate::node::NodeKey;
use crate::node::NodeTemplate;
use weave_bridge::ViewId;

/// spec §4.4 R2: an opt-in override that can take over reconciliation of a
/// specific `new.runtime_type()` entirely, bypassing every other dispatch
/// rule below it. Mirrors [`crate::PropsInterceptor`]'s stance (spec §4.2:
/// "semantics of interceptors are out of scope for the core") — the core
/// only defines the seam and the default dispatch order; the policy for
/// what an override actually does is the registering caller's.
#[async_trait::async_trait(?Send)]
pub trait ReconcileExtension {
    /// Decides whether this handler owns reconciliation of this `(old,
    /// new)` pair. Checked after R1's identity fast path and before every
    /// other rule (structural shock, key rule, kind dispatch).
    fn opts_in(&self, ctx: &ReconcileCtx, old: NodeKey, new: &NodeTemplate) -> bool;

    /// Called only when `opts_in` returned `true`. Responsible for
    /// everything the default algorithm would be: recursing into children,
    /// issuing bridge effects, and returning the canonical `NodeKey` for
    /// this position.
    async fn reconcile_override(
        &self,
        ctx: &mut ReconcileCtx<'_>,
        old: NodeKey,
        new: NodeTemplate,
        parent_view_id: ViewId,
        index: usize,
    ) -> Result<NodeKey, ReconcileError>;
}
