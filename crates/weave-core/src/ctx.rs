use crate::config::EngineConfig;
use crate::effects::EffectList;
use crate::extension::ReconcileExtension;
use crate::node::{ComponentId, Node, NodeKey};
use crate::props::PropsDiffer;
use crate::registry::NodeRegistry;
use crate::similarity::SimilarityCache;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use std::rc::Rc;

/// Everything the reconciler and child-list algorithms need, borrowed from
/// [`crate::engine::Engine`] for the duration of one reconciliation call.
/// Grouping these as disjoint `&mut` fields (rather than passing `&mut
/// Engine`) keeps `reconciler.rs`/`child_list.rs` free of a dependency on
/// the facade, matching the teacher's split between `diff.rs` (pure
/// algorithm) and `runtime.rs` (owns the state `diff.rs` borrows).
pub struct ReconcileCtx<'a> {
    pub arena: &'a mut SlotMap<NodeKey, Node>,
    pub registry: &'a mut NodeRegistry,
    pub similarity: &'a mut SimilarityCache,
    pub props_differ: &'a PropsDiffer,
    pub effects: &'a mut EffectList,
    pub config: &'a EngineConfig,
    /// Set while the engine is in structural-shock mode (spec §4.4 R3):
    /// forces every `reconcile` call to short-circuit to `replace`.
    pub structural_shock: bool,
    /// Render-in-flight guard (spec §4.7): a component re-entering its own
    /// `render()` while already present here is E4.
    pub render_in_flight: &'a mut FxHashSet<ComponentId>,
    /// Per-component `update_component_by_id` call counter within the
    /// current batch (spec §4.7 render-cycle guard).
    pub render_counts: &'a mut FxHashMap<ComponentId, u32>,
    /// spec §4.4 R2: opt-in reconciliation overrides, keyed by
    /// `runtime_type`.
    pub extensions: &'a FxHashMap<String, Rc<dyn ReconcileExtension>>,
    /// Total children processed across the current `mount`/batch (spec §5:
    /// "yields to the host every k children"). Shared across every nested
    /// `reconcile_children` call within the operation rather than reset per
    /// level, so a wide-and-deep tree still yields on the same cadence as a
    /// wide-and-shallow one.
    pub yield_counter: &'a mut usize,
}

impl<'a> ReconcileCtx<'a> {
    /// Call once per child handled inside a list-reconciliation or
    /// fresh-mount children loop. Returns `true` when the caller should
    /// `tokio::task::yield_now().await` before continuing, so a single large
    /// subtree cannot monopolize the executor (spec §5, `k ≈
    /// config.yield_every_k_children`).
    pub fn note_child_processed(&mut self) -> bool {
        *self.yield_counter += 1;
        self.config.yield_every_k_children > 0 && *self.yield_counter % self.config.yield_every_k_children == 0
    }
}
