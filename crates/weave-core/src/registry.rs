use crate::node::NodeKey;
use rustc_hash::FxHashMap;
use weave_bridge::{ViewId, ViewIdAllocator};

/// `view_id → NodeKey` bookkeeping (spec §4.1). Only Elements are ever
/// bound; any caller that would bind a Component must redirect to the
/// Component's rendered element instead (I1).
#[derive(Default)]
pub struct NodeRegistry {
    allocator: ViewIdAllocator,
    bindings: FxHashMap<ViewId, NodeKey>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_view_id(&mut self) -> ViewId {
        self.allocator.alloc()
    }

    /// Associates `view_id` with `element`, returning the prior binding (if
    /// any) so callers can detect corrupt state (spec §4.1, E6).
    pub fn bind(&mut self, view_id: ViewId, element: NodeKey) -> Option<NodeKey> {
        self.bindings.insert(view_id, element)
    }

    pub fn unbind(&mut self, view_id: ViewId) -> Option<NodeKey> {
        self.bindings.remove(&view_id)
    }

    pub fn lookup(&self, view_id: ViewId) -> Option<NodeKey> {
        self.bindings.get(&view_id).copied()
    }

    pub fn contains(&self, view_id: ViewId) -> bool {
        self.bindings.contains_key(&view_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All live view-ids, for property tests (P2, P9) and structural-shock
    /// teardown (spec §4.7).
    pub fn live_view_ids(&self) -> Vec<ViewId> {
        self.bindings.keys().copied().collect()
    }

    /// Full reset, used by structural shock and `shutdown()` (spec §4.7, §6.2).
    /// Note the allocator is *not* reset: view-ids are never reused (I5),
    /// even across a structural-shock teardown.
    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }
}
