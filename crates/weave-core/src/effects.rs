use crate::node::ComponentHandle;
use weave_bridge::{ChangedProps, PropMap, ViewId};

/// One reified bridge call (spec §4.9, §6.1), queued by the reconciler and
/// replayed in order by [`crate::bridge_client::BridgeClient`]. Mirrors the
/// teacher's `Mutation` enum, generalized to the spec's bridge operation set.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeEffect {
    CreateView {
        view_id: ViewId,
        type_name: String,
        props: PropMap,
    },
    UpdateView {
        view_id: ViewId,
        changed_props: ChangedProps,
    },
    DeleteView {
        view_id: ViewId,
    },
    AttachView {
        child: ViewId,
        parent: ViewId,
        index: usize,
    },
    DetachView {
        child: ViewId,
    },
    SetChildren {
        parent: ViewId,
        children: Vec<ViewId>,
    },
    AddEventListeners {
        view_id: ViewId,
        types: Vec<String>,
    },
    RemoveEventListeners {
        view_id: ViewId,
        types: Vec<String>,
    },
}

/// A deferred lifecycle call, run against the component instance directly
/// (not through the bridge) once the bridge effects that made it true have
/// been committed.
pub enum LifecycleEffect {
    DidMount(ComponentHandle),
    DidUpdate(ComponentHandle),
    WillUnmount(ComponentHandle),
}

/// Ordered buffer of pending bridge operations (spec §2, §5: "Effects
/// inside a single batch are committed in insertion order: deletions →
/// placements → updates → lifecycle").
///
/// Reconciliation pushes into whichever of the four buckets an effect
/// belongs to as it runs (creation, attach, detach and deletion calls can
/// be emitted in any relative order by the algorithm itself); `drain_ordered`
/// reassembles them into the one sequence the spec mandates.
#[derive(Default)]
pub struct EffectList {
    deletions: Vec<BridgeEffect>,
    placements: Vec<BridgeEffect>,
    updates: Vec<BridgeEffect>,
    immediate_lifecycle: Vec<LifecycleEffect>,
    layout_effects: std::collections::VecDeque<LifecycleEffect>,
    insertion_effects: std::collections::VecDeque<LifecycleEffect>,
}

impl EffectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_deletion(&mut self, effect: BridgeEffect) {
        self.deletions.push(effect);
    }

    pub fn push_placement(&mut self, effect: BridgeEffect) {
        self.placements.push(effect);
    }

    pub fn push_update(&mut self, effect: BridgeEffect) {
        self.updates.push(effect);
    }

    pub fn push_immediate_lifecycle(&mut self, effect: LifecycleEffect) {
        self.immediate_lifecycle.push(effect);
    }

    pub fn push_layout_effect(&mut self, effect: LifecycleEffect) {
        self.layout_effects.push_back(effect);
    }

    pub fn push_insertion_effect(&mut self, effect: LifecycleEffect) {
        self.insertion_effects.push_back(effect);
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.placements.is_empty() && self.updates.is_empty()
    }

    /// The bridge-facing effect stream, in the mandated order. Lifecycle
    /// calls are not bridge effects and are drained separately via
    /// [`EffectList::drain_lifecycle`].
    pub fn drain_ordered(&mut self) -> Vec<BridgeEffect> {
        let mut out = Vec::with_capacity(self.deletions.len() + self.placements.len() + self.updates.len());
        out.append(&mut self.deletions);
        out.append(&mut self.placements);
        out.append(&mut self.updates);
        out
    }

    /// Runs every queued lifecycle call (`componentDidMount`/`componentDidUpdate`/
    /// `componentWillUnmount`) against the live instance, then the layout and
    /// insertion effect queues (spec §4.8 step 9, §4.9, §9 "microtask effect
    /// phases"). This implementation drains layout/insertion effects
    /// synchronously at the end of the same commit rather than on a later
    /// host tick, since the spec does not mandate true deferral and
    /// determinism benefits the test suite.
    pub fn drain_lifecycle(&mut self) {
        for effect in self.immediate_lifecycle.drain(..) {
            run_lifecycle(effect);
        }
        while let Some(effect) = self.layout_effects.pop_front() {
            run_lifecycle(effect);
        }
        while let Some(effect) = self.insertion_effects.pop_front() {
            run_lifecycle(effect);
        }
    }

    /// Clears every queue without running them (spec §5: "clearing their
    /// source sets suppresses their execution"), used by
    /// `cancel_all_pending_work` and structural-shock teardown.
    pub fn clear(&mut self) {
        self.deletions.clear();
        self.placements.clear();
        self.updates.clear();
        self.immediate_lifecycle.clear();
        self.layout_effects.clear();
        self.insertion_effects.clear();
    }
}

fn run_lifecycle(effect: LifecycleEffect) {
    match effect {
        LifecycleEffect::DidMount(handle) => handle.borrow_mut().component_did_mount(),
        LifecycleEffect::DidUpdate(handle) => handle.borrow_mut().component_did_update(),
        LifecycleEffect::WillUnmount(handle) => handle.borrow_mut().component_will_unmount(),
    }
}
