use crate::bridge_client::BridgeClient;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::ctx::ReconcileCtx;
use crate::effects::{BridgeEffect, EffectList};
use crate::error::{ReconcileError, RegistryRepair};
use crate::events::EventRouter;
use crate::extension::ReconcileExtension;
use crate::node::{ComponentHandle, ComponentId, Node, NodeKey, NodeTemplate};
use crate::props::PropsDiffer;
use crate::reconciler;
use crate::registry::NodeRegistry;
use crate::scheduler::{Priority, UpdateScheduler};
use crate::similarity::SimilarityCache;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::rc::Rc;
use weave_bridge::{Bridge, PropMap, RawEvent, Value, ViewId};
use weave_worker::{structural_fingerprint, SerializedNode, SerializedValue, WorkerPool};

/// Builds a [`ReconcileCtx`] borrowing disjoint fields of `$self` inline, so
/// the borrow checker sees the individual field projections rather than a
/// single opaque `&mut self` (which a helper *method* returning the struct
/// would produce). Expands at the call site, not through a function
/// boundary — that's the whole trick.
macro_rules! ctx {
    ($self:ident) => {
        ReconcileCtx {
            arena: &mut $self.arena,
            registry: &mut $self.registry,
            similarity: &mut $self.similarity,
            props_differ: &$self.props_differ,
            effects: &mut $self.effects,
            config: &$self.config,
            structural_shock: $self.structural_shock,
            render_in_flight: &mut $self.render_in_flight,
            render_counts: &mut $self.render_counts,
            extensions: &$self.extensions,
            yield_counter: &mut $self.yield_counter,
        }
    };
}

/// The facade spec §6.2 describes: owns the committed arena, the bridge
/// client, the scheduler, and every piece of per-engine bookkeeping the
/// algorithms in `reconciler.rs`/`child_list.rs` borrow for the duration of
/// one call. Generic over [`Clock`] so debounce/cooldown/timeout behavior is
/// deterministically testable (default `SystemClock` for production use),
/// mirroring the teacher's split between `Runtime` (owns state) and `diff.rs`
/// (pure algorithm over borrowed state).
pub struct Engine<B: Bridge, C: Clock = SystemClock> {
    bridge_client: BridgeClient<B>,
    clock: C,
    config: EngineConfig,

    arena: SlotMap<NodeKey, Node>,
    registry: NodeRegistry,
    similarity: SimilarityCache,
    props_differ: PropsDiffer,
    effects: EffectList,
    scheduler: UpdateScheduler,

    root: Option<NodeKey>,
    node_by_component: FxHashMap<ComponentId, NodeKey>,
    render_in_flight: FxHashSet<ComponentId>,
    render_counts: FxHashMap<ComponentId, u32>,
    structural_shock: bool,
    registry_repairs: Vec<RegistryRepair>,
    /// spec §4.4 R2 overrides, keyed by `runtime_type`. See
    /// [`Engine::register_reconcile_extension`].
    extensions: FxHashMap<String, Rc<dyn ReconcileExtension>>,
    /// Shared cadence counter for [`ReconcileCtx::note_child_processed`]
    /// (spec §5 anti-starvation yielding); reset at the top of every
    /// `mount`/`run_batch` so each commit starts its own cadence.
    yield_counter: usize,

    worker: Option<WorkerPool>,
    skip_worker_for_reconciliation: bool,
}

impl<B: Bridge> Engine<B, SystemClock> {
    pub fn new(bridge: B, config: EngineConfig) -> Self {
        Self::with_clock(bridge, SystemClock::default(), config)
    }
}

impl<B: Bridge, C: Clock> Engine<B, C> {
    pub fn with_clock(bridge: B, clock: C, config: EngineConfig) -> Self {
        Self {
            bridge_client: BridgeClient::new(bridge, config),
            clock,
            config,
            arena: SlotMap::with_key(),
            registry: NodeRegistry::new(),
            similarity: SimilarityCache::new(config.similarity_cache_capacity),
            props_differ: PropsDiffer::new(),
            effects: EffectList::new(),
            scheduler: UpdateScheduler::new(config.scheduler_queue_ceiling, config.batch_cooldown_ms),
            root: None,
            node_by_component: FxHashMap::default(),
            render_in_flight: FxHashSet::default(),
            render_counts: FxHashMap::default(),
            structural_shock: false,
            registry_repairs: Vec::new(),
            extensions: FxHashMap::default(),
            yield_counter: 0,
            worker: None,
            skip_worker_for_reconciliation: false,
        }
    }

    /// spec §4.4 R2: registers an opt-in reconciliation override for a given
    /// `runtime_type`. Checked ahead of every other dispatch rule, right
    /// after R1's identity fast path; the handler decides per-call via
    /// `opts_in` whether it actually wants to take over, so registering one
    /// does not force every node of that runtime type through it.
    pub fn register_reconcile_extension(&mut self, runtime_type: impl Into<String>, handler: Rc<dyn ReconcileExtension>) {
        self.extensions.insert(runtime_type.into(), handler);
    }

    pub async fn initialize_bridge(&mut self) -> bool {
        self.bridge_client.initialize().await
    }

    pub fn bridge(&self) -> &B {
        self.bridge_client.inner()
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        self.bridge_client.inner_mut()
    }

    pub fn root_view_id(&self) -> Option<ViewId> {
        self.root.and_then(|k| self.arena[k].effective_view_id())
    }

    pub fn live_view_count(&self) -> usize {
        self.registry.len()
    }

    /// E6 safety-net findings from the most recent batch/mount, empty when
    /// nothing needed repair.
    pub fn last_registry_repairs(&self) -> &[RegistryRepair] {
        &self.registry_repairs
    }

    pub fn is_pending(&self, component: &ComponentHandle) -> bool {
        self.scheduler.is_pending(ComponentId::of(component))
    }

    pub fn pending_len(&self) -> usize {
        self.scheduler.pending_len()
    }

    /// Enables the experimental background-diff cross-check (spec §5, §9).
    /// The authoritative reconciliation always runs in-task regardless of
    /// what the worker reports — see `cross_check_offload` for why.
    pub fn enable_worker_offload(&mut self, worker_count: usize) {
        self.worker = Some(WorkerPool::new(worker_count));
    }

    pub fn disable_worker_offload(&mut self) {
        self.worker = None;
    }

    /// spec §6.2 `mount(root_template)`. First call materializes a fresh
    /// tree under the host-provided root; subsequent calls reconcile the new
    /// template against the previously committed root, detecting structural
    /// shock (spec §4.7) along the way.
    pub async fn mount(&mut self, template: NodeTemplate) -> Result<(), ReconcileError> {
        let shock = match self.root {
            Some(old_root) => self.detect_structural_shock(old_root, &template),
            None => false,
        };

        self.bridge_client.begin_batch().await;
        self.yield_counter = 0;

        if shock {
            tracing::warn!("structural shock detected on mount: tearing down the previous tree");
            self.structural_shock = true;
            self.run_structural_shock_teardown();
        }

        let outcome: Result<NodeKey, ReconcileError> = if let Some(old_root) = self.root {
            let mut ctx = ctx!(self);
            reconciler::reconcile(&mut ctx, old_root, template, ViewId::ROOT, 0).await
        } else {
            let mut ctx = ctx!(self);
            reconciler::render_to_native(&mut ctx, template, None, Some(ViewId::ROOT), Some(0)).await.map(|(key, _)| key)
        };

        match outcome {
            Ok(new_root) => {
                self.root = Some(new_root);
                self.flush_effects().await;
                self.bridge_client.commit_batch().await?;
                self.structural_shock = false;
                self.rebuild_component_index();
                self.verify_registry_postcondition();
                Ok(())
            }
            Err(err) => {
                self.effects.clear();
                self.bridge_client.cancel_batch().await;
                self.structural_shock = false;
                Err(err)
            }
        }
    }

    /// spec §6.2 `scheduleUpdate(component)`: queues a re-render at
    /// [`Priority::Normal`]. Call [`Engine::schedule_update_with_priority`]
    /// directly for urgent (input-driven) or idle (analytics-driven) work.
    pub fn schedule_update(&mut self, component: &ComponentHandle) {
        self.schedule_update_with_priority(component, Priority::Normal);
    }

    pub fn schedule_update_with_priority(&mut self, component: &ComponentHandle, priority: Priority) {
        let id = ComponentId::of(component);
        let now = self.clock.now_ms();
        self.scheduler.schedule(id, priority, now);
    }

    /// Schedules every currently-mounted stateful component at
    /// [`Priority::Immediate`] (spec §6.2 `forceFullRerender`).
    pub fn force_full_rerender(&mut self) {
        let now = self.clock.now_ms();
        let ids: Vec<ComponentId> = self.node_by_component.keys().copied().collect();
        for id in ids {
            self.scheduler.schedule(id, Priority::Immediate, now);
        }
    }

    /// spec §6.2 `dispatchEvent(view_id, type, data)`.
    pub fn dispatch_event(&mut self, view_id: ViewId, event_type: String, data: FxHashMap<String, Value>) {
        let event = RawEvent { view_id, event_type, data };
        if !EventRouter::dispatch(&self.arena, &self.registry, &event) {
            tracing::debug!(?view_id, "dispatch_event: no live handler for this view/type pair");
        }
    }

    /// If a batch is due (debounce elapsed, cooldown satisfied), drains and
    /// runs it. Returns whether a batch ran. The host drives this from its
    /// own tick/frame loop; nothing here arms an OS timer.
    pub async fn poll(&mut self) -> Result<bool, ReconcileError> {
        let now = self.clock.now_ms();
        let Some(ids) = self.scheduler.poll(now) else {
            return Ok(false);
        };
        self.run_batch(ids).await?;
        Ok(true)
    }

    /// spec §6.2 `shutdown()`: cancels pending work, drops queued effects
    /// without running them, and tears down the worker pool.
    pub async fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.effects.clear();
        self.render_in_flight.clear();
        self.render_counts.clear();
        if let Some(mut pool) = self.worker.take() {
            pool.shutdown();
        }
        tracing::info!("engine shutdown");
    }

    /// spec §4.7 commit cycle: one `begin_batch`/`commit_batch` pair for the
    /// whole drained set, in priority order, with the whole batch cancelled
    /// if any component's update fails fatally (E2 unhandled, E4).
    async fn run_batch(&mut self, ids: Vec<ComponentId>) -> Result<(), ReconcileError> {
        self.render_counts.clear();
        self.skip_worker_for_reconciliation = false;
        self.yield_counter = 0;
        self.bridge_client.begin_batch().await;

        let mut fatal: Option<ReconcileError> = None;
        for id in ids {
            if let Err(err) = self.update_one_component(id).await {
                fatal = Some(err);
                break;
            }
        }

        match fatal {
            None => {
                self.flush_effects().await;
                self.bridge_client.commit_batch().await?;
                self.rebuild_component_index();
                self.verify_registry_postcondition();
                Ok(())
            }
            Some(err) => {
                self.effects.clear();
                self.bridge_client.cancel_batch().await;
                tracing::error!(%err, "batch cancelled");
                Err(err)
            }
        }
    }

    /// spec §4.8, with the render-cycle guard and error-boundary routing
    /// this facade is responsible for (the pure per-node algorithm lives in
    /// `reconciler::update_component_by_id`).
    async fn update_one_component(&mut self, id: ComponentId) -> Result<(), ReconcileError> {
        let Some(&node_key) = self.node_by_component.get(&id) else {
            // The component was unmounted between scheduling and this batch
            // draining: a no-op, not an error (spec §4.8 step 1).
            return Ok(());
        };

        let count = self.render_counts.entry(id).or_insert(0);
        *count += 1;
        if *count > self.config.render_guard_ceiling {
            return Err(ReconcileError::InfiniteRender {
                diagnosis: format!(
                    "component updated more than {} times in one batch; likely a state update \
                     inside render(), an invalid key forcing repeated remounts, or a circular \
                     render dependency",
                    self.config.render_guard_ceiling
                ),
            });
        }

        let offload_snapshot = self.snapshot_for_offload(node_key);

        let result = {
            let mut ctx = ctx!(self);
            reconciler::update_component_by_id(&mut ctx, node_key).await
        };

        if let (Some(before), Ok(())) = (&offload_snapshot, &result) {
            if let Some(after) = self.snapshot_rendered(node_key) {
                self.cross_check_offload(before.clone(), after).await;
            }
        }

        match result {
            Ok(()) => Ok(()),
            Err(ReconcileError::RenderThrew { message }) => self.handle_render_error(node_key, message),
            Err(other) => Err(other),
        }
    }

    /// E2: a component's `render()` failed. Walks up the arena's parent
    /// chain for the nearest `ErrorBoundary`-capable ancestor; if one
    /// exists, it absorbs the error and the batch continues. Otherwise the
    /// error propagates and cancels the batch.
    fn handle_render_error(&mut self, node_key: NodeKey, message: String) -> Result<(), ReconcileError> {
        let error = ReconcileError::RenderThrew { message: message.clone() };
        if let Some(boundary) = self.find_error_boundary(node_key) {
            if let Some(capability) = boundary.borrow_mut().as_error_boundary() {
                capability.on_error(&error, &[message.clone()]);
            }
            tracing::error!(%message, "E2 RenderThrew: absorbed by an enclosing ErrorBoundary");
            Ok(())
        } else {
            Err(error)
        }
    }

    fn find_error_boundary(&self, node_key: NodeKey) -> Option<ComponentHandle> {
        let mut current = self.arena[node_key].parent();
        while let Some(key) = current {
            if let Node::Stateful(n) = &self.arena[key] {
                if n.instance.borrow_mut().as_error_boundary().is_some() {
                    return Some(n.instance.clone());
                }
            }
            current = self.arena[key].parent();
        }
        None
    }

    /// spec §4.7: "On a root swap where the new root either has a different
    /// runtime type than the committed root, OR whose rendered subtree
    /// differs from the committed rendered subtree by `structural_similarity
    /// < 0.3` or `props_similarity < 0.5`." The finer-grained check only
    /// applies when both sides resolve to an Element — every other
    /// kind/type mismatch is already caught by the coarser runtime-type
    /// comparison, so nothing is silently skipped (see DESIGN.md).
    fn detect_structural_shock(&mut self, old_root: NodeKey, new_template: &NodeTemplate) -> bool {
        if self.arena[old_root].runtime_type() != new_template.runtime_type() {
            return true;
        }

        let resolved_old = resolve_rendered(&self.arena, old_root);
        let is_element_pair = matches!(self.arena[resolved_old], Node::Element(_)) && matches!(new_template, NodeTemplate::Element { .. });
        if !is_element_pair {
            return false;
        }

        if let (Node::Element(old_el), NodeTemplate::Element { props: new_props, .. }) = (&self.arena[resolved_old], new_template) {
            if crate::similarity::props_similarity(&old_el.props, new_props) < 0.5 {
                return true;
            }
        }

        self.similarity.structural_similarity(&self.arena, resolved_old, new_template) < 0.3
    }

    /// spec §4.7: full teardown on structural shock. Every previously
    /// registered view-id is individually deleted (the host's root view
    /// itself, `ViewId::ROOT`, is never created and so never deleted), the
    /// old subtree is disposed, and every tracking map is reset — except the
    /// view-id allocator (I5: ids are never reused).
    fn run_structural_shock_teardown(&mut self) {
        for view_id in self.registry.live_view_ids() {
            self.effects.push_deletion(BridgeEffect::DeleteView { view_id });
        }
        if let Some(root) = self.root.take() {
            let mut ctx = ctx!(self);
            reconciler::dispose_subtree(&mut ctx, root);
        }
        self.registry.clear_bindings();
        self.similarity.clear();
        self.scheduler.cancel_all();
        self.render_in_flight.clear();
        self.render_counts.clear();
        self.node_by_component.clear();
    }

    /// spec §7 E1: when a `CreateView` fails, that view's subtree is
    /// abandoned — every later effect rooted at it (updates, listener
    /// changes, its own deletion, attaches of its descendants) is skipped
    /// rather than applied against a view the host never actually created.
    /// Ancestors and unrelated siblings are unaffected and continue to
    /// commit normally.
    async fn flush_effects(&mut self) {
        let ordered = self.effects.drain_ordered();
        let mut abandoned: FxHashSet<ViewId> = FxHashSet::default();

        for effect in ordered {
            let subject = effect_subject(&effect);
            if abandoned.contains(&subject) {
                tracing::warn!(?subject, "E1 BridgeFailure: skipping effect rooted at an abandoned subtree");
                continue;
            }
            if let BridgeEffect::AttachView { parent, .. } = &effect {
                if abandoned.contains(parent) {
                    abandoned.insert(subject);
                    tracing::warn!(?subject, "E1 BridgeFailure: skipping attach into an abandoned subtree");
                    continue;
                }
            }
            if let BridgeEffect::SetChildren { parent, children } = &effect {
                if abandoned.contains(parent) {
                    continue;
                }
                if children.iter().any(|c| abandoned.contains(c)) {
                    let filtered: Vec<ViewId> = children.iter().copied().filter(|c| !abandoned.contains(c)).collect();
                    tracing::warn!(?parent, "E1 BridgeFailure: filtering abandoned children out of set_children");
                    if let Some(err) = self.bridge_client.apply(BridgeEffect::SetChildren { parent: *parent, children: filtered }).await {
                        tracing::error!(%err, ?parent, "E1 BridgeFailure: bridge effect failed");
                    }
                    continue;
                }
            }

            let is_create = matches!(effect, BridgeEffect::CreateView { .. });
            if let Some(err) = self.bridge_client.apply(effect).await {
                tracing::error!(%err, ?subject, "E1 BridgeFailure: bridge effect failed");
                if is_create {
                    abandoned.insert(subject);
                }
            }
        }
        self.effects.drain_lifecycle();
    }

    /// O(n) rebuild rather than incremental bookkeeping: simpler to reason
    /// about and keep correct than threading `ComponentId` updates through
    /// every reconciliation path that can swap a `StatefulNode`'s instance
    /// (R7, `replace`), at a cost acceptable for this engine's scale.
    fn rebuild_component_index(&mut self) {
        self.node_by_component.clear();
        for (key, node) in self.arena.iter() {
            if let Node::Stateful(n) = node {
                self.node_by_component.insert(ComponentId::of(&n.instance), key);
            }
        }
    }

    /// E6: re-verify every live Element's view-id binds back to itself,
    /// repairing any mismatch. A safety net, not expected to fire in normal
    /// operation.
    fn verify_registry_postcondition(&mut self) {
        let mut repairs = Vec::new();
        let element_keys: Vec<NodeKey> = self
            .arena
            .iter()
            .filter_map(|(k, n)| matches!(n, Node::Element(_)).then_some(k))
            .collect();

        for key in element_keys {
            if let Node::Element(n) = &self.arena[key] {
                if let Some(view_id) = n.view_id {
                    if self.registry.lookup(view_id) != Some(key) {
                        self.registry.bind(view_id, key);
                        repairs.push(RegistryRepair { view_id, reason: "post-commit binding mismatch" });
                    }
                }
            }
        }

        if !repairs.is_empty() {
            tracing::error!(count = repairs.len(), "E6 RegistryCorruption: repaired stale registry bindings");
        }
        self.registry_repairs = repairs;
    }

    /// Takes a pre-update snapshot for the offload cross-check, only when
    /// worker offload is enabled and the subtree clears the configured size
    /// threshold (spec §5: "≥20 nodes, non-initial render").
    fn snapshot_for_offload(&self, node_key: NodeKey) -> Option<SerializedNode> {
        if self.worker.is_none() || self.skip_worker_for_reconciliation {
            return None;
        }
        let Node::Stateful(n) = &self.arena[node_key] else {
            return None;
        };
        let rendered = n.rendered?;
        if subtree_node_count(&self.arena, rendered) < self.config.worker_offload_threshold_nodes {
            return None;
        }
        Some(serialize_node(&self.arena, rendered))
    }

    fn snapshot_rendered(&self, node_key: NodeKey) -> Option<SerializedNode> {
        let Node::Stateful(n) = &self.arena[node_key] else {
            return None;
        };
        Some(serialize_node(&self.arena, n.rendered?))
    }

    /// spec §9: never gate the fallback on the worker's own "no changes"
    /// signal — cross-check it against a quick structural-equality pre-check
    /// first. Here that's a post-hoc consistency check only: the
    /// authoritative mutation has already happened via the normal in-task
    /// `reconciler::update_component_by_id` by the time this runs, so a
    /// worker disagreement can only disable offload for future components in
    /// this reconciliation — it never changes what was applied. Re-deriving
    /// bridge effects from a `WorkerChange` list in a second code path would
    /// risk drifting from the single source of truth in `reconciler.rs`
    /// (see DESIGN.md).
    async fn cross_check_offload(&mut self, before: SerializedNode, after: SerializedNode) {
        let Some(pool) = self.worker.as_ref() else { return };
        if self.skip_worker_for_reconciliation {
            return;
        }

        let fp_before = structural_fingerprint(&before);
        let fp_after = structural_fingerprint(&after);

        match pool.diff(before, after).await {
            Ok(changes) => {
                if changes.is_empty() && fp_before != fp_after {
                    tracing::warn!(
                        "E5 WorkerFailure: worker reported no changes despite a structural fingerprint \
                         difference; disabling offload for the remainder of this reconciliation"
                    );
                    self.skip_worker_for_reconciliation = true;
                } else {
                    tracing::debug!(changes = changes.len(), "worker offload diff cross-check");
                }
            }
            Err(err) => {
                tracing::warn!(%err, "E5 WorkerFailure: offload diff failed, disabling offload for this reconciliation");
                self.skip_worker_for_reconciliation = true;
            }
        }
    }
}

/// The view-id an effect is "about" — the id whose abandonment should
/// suppress it (spec §7 E1).
fn effect_subject(effect: &BridgeEffect) -> ViewId {
    match effect {
        BridgeEffect::CreateView { view_id, .. } => *view_id,
        BridgeEffect::UpdateView { view_id, .. } => *view_id,
        BridgeEffect::DeleteView { view_id } => *view_id,
        BridgeEffect::AttachView { child, .. } => *child,
        BridgeEffect::DetachView { child } => *child,
        BridgeEffect::SetChildren { parent, .. } => *parent,
        BridgeEffect::AddEventListeners { view_id, .. } => *view_id,
        BridgeEffect::RemoveEventListeners { view_id, .. } => *view_id,
    }
}

fn resolve_rendered(arena: &SlotMap<NodeKey, Node>, key: NodeKey) -> NodeKey {
    match &arena[key] {
        Node::Stateful(n) => n.rendered.map(|r| resolve_rendered(arena, r)).unwrap_or(key),
        Node::Stateless(n) => n.rendered.map(|r| resolve_rendered(arena, r)).unwrap_or(key),
        _ => key,
    }
}

fn subtree_node_count(arena: &SlotMap<NodeKey, Node>, key: NodeKey) -> usize {
    let mut count = 1;
    match &arena[key] {
        Node::Element(n) => {
            for &c in &n.children {
                count += subtree_node_count(arena, c);
            }
        }
        Node::Fragment(n) => {
            for &c in &n.children {
                count += subtree_node_count(arena, c);
            }
        }
        Node::Stateful(n) => {
            if let Some(r) = n.rendered {
                count += subtree_node_count(arena, r);
            }
        }
        Node::Stateless(n) => {
            if let Some(r) = n.rendered {
                count += subtree_node_count(arena, r);
            }
        }
        Node::Empty(_) => {}
    }
    count
}

fn serialize_value(value: &Value) -> SerializedValue {
    match value {
        Value::Null => SerializedValue::Null,
        Value::Bool(b) => SerializedValue::Bool(*b),
        Value::Int(i) => SerializedValue::Int(*i),
        Value::Float(bits) => SerializedValue::Text(f64::from_bits(*bits).to_string()),
        Value::Text(s) => SerializedValue::Text(s.clone()),
        Value::List(items) => SerializedValue::List(items.iter().map(serialize_value).collect()),
        Value::Map(m) => SerializedValue::Map(m.iter().map(|(k, v)| (k.clone(), serialize_value(v))).collect()),
        // Handlers are function-valued and erased on the worker side anyway
        // (spec: the worker's tree model is function-free).
        Value::Handler(_) => SerializedValue::Opaque,
    }
}

fn serialize_props(props: &PropMap) -> BTreeMap<String, SerializedValue> {
    props.iter().map(|(k, v)| (k.clone(), serialize_value(v))).collect()
}

/// Flattens components away: the worker's tree model only knows Element,
/// Fragment, and Empty (already-rendered content), matching
/// `weave_worker::SerializedNode`.
fn serialize_node(arena: &SlotMap<NodeKey, Node>, key: NodeKey) -> SerializedNode {
    match &arena[key] {
        Node::Element(n) => SerializedNode::Element {
            type_name: n.type_name.clone(),
            key: n.key.clone(),
            props: serialize_props(&n.props),
            children: n.children.iter().map(|&c| serialize_node(arena, c)).collect(),
        },
        Node::Fragment(n) => SerializedNode::Fragment {
            children: n.children.iter().map(|&c| serialize_node(arena, c)).collect(),
        },
        Node::Stateful(n) => n.rendered.map(|r| serialize_node(arena, r)).unwrap_or(SerializedNode::Empty),
        Node::Stateless(n) => n.rendered.map(|r| serialize_node(arena, r)).unwrap_or(SerializedNode::Empty),
        Node::Empty(_) => SerializedNode::Empty,
    }
}
