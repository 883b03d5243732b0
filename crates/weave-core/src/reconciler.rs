use crate::child_list;
use crate::ctx::ReconcileCtx;
use crate::effects::{BridgeEffect, LifecycleEffect};
use crate::error::ReconcileError;
use crate::node::{
    ComponentId, Children, ElementNode, EmptyNode, FragmentNode, Node, NodeKey, NodeKind, NodeTemplate, StatefulNode,
    StatelessNode,
};
use futures::future::{FutureExt, LocalBoxFuture};
use rustc_hash::FxHashSet;
use std::rc::Rc;
use weave_bridge::ViewId;

fn template_kind(template: &NodeTemplate) -> NodeKind {
    match template {
        NodeTemplate::Element { .. } => NodeKind::Element,
        NodeTemplate::Stateful { .. } => NodeKind::Stateful,
        NodeTemplate::Stateless { .. } => NodeKind::Stateless,
        NodeTemplate::Fragment { .. } => NodeKind::Fragment,
        NodeTemplate::Empty => NodeKind::Empty,
    }
}

/// The central algorithm (spec §4.4). `old` is an already-materialized
/// arena node; `new` is the not-yet-materialized template produced by the
/// parent's fresh render. Returns the `NodeKey` that is now canonical for
/// this position: usually `old` itself (mutated in place), occasionally a
/// freshly materialized key when the two sides were replaced.
///
/// Returns a boxed future rather than being an `async fn` directly: this
/// function, `render_to_native`/`render_to_native_with_id` below, and their
/// mutual callers recurse into each other to walk a tree of unbounded
/// depth, and an `async fn` that (indirectly) calls itself produces an
/// infinitely-sized state machine unless the cycle is broken by boxing at
/// least one edge.
pub fn reconcile<'ctx>(
    ctx: &'ctx mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    parent_view_id: ViewId,
    index: usize,
) -> LocalBoxFuture<'ctx, Result<NodeKey, ReconcileError>> {
    async move {
        // R1: fast-path identity. The exact same component instance reappearing
        // means nothing below it could have changed (its own re-render, if any,
        // is handled by its own scheduler entry); transfer nothing, recurse
        // into nothing.
        if let (Node::Stateful(old_n), NodeTemplate::Stateful { instance: new_instance, .. }) = (&ctx.arena[old], &new) {
            if Rc::ptr_eq(&old_n.instance, new_instance) {
                return Ok(old);
            }
        }

        // R2: custom handler / extension opt-in delegation (spec §4.4 R2).
        // An extension registered for `new.runtime_type()` gets first refusal
        // ahead of every rule below; if it opts in, it owns reconciliation of
        // this pair entirely.
        if let Some(handler) = ctx.extensions.get(new.runtime_type()).cloned() {
            if handler.opts_in(ctx, old, &new) {
                return handler.reconcile_override(ctx, old, new, parent_view_id, index).await;
            }
        }

        // R3: structural shock forces full replacement, bypassing position-based
        // matching during drastic tree changes.
        if ctx.structural_shock {
            return replace(ctx, old, new, parent_view_id, index).await;
        }

        // R5: key rule.
        if let (Some(old_key), Some(new_key)) = (ctx.arena[old].key(), new.key()) {
            if old_key != new_key {
                return replace(ctx, old, new, parent_view_id, index).await;
            }
        }

        // R4: kind + runtime-type dispatch.
        let old_kind = ctx.arena[old].kind();
        let new_kind = template_kind(&new);
        if old_kind != new_kind || ctx.arena[old].runtime_type() != new.runtime_type() {
            return replace(ctx, old, new, parent_view_id, index).await;
        }

        match new_kind {
            NodeKind::Element => reconcile_element(ctx, old, new, parent_view_id, index).await,
            NodeKind::Stateful => reconcile_stateful(ctx, old, new, parent_view_id, index).await,
            NodeKind::Stateless => reconcile_stateless(ctx, old, new, parent_view_id, index).await,
            NodeKind::Fragment => reconcile_fragment(ctx, old, new, parent_view_id, index).await,
            NodeKind::Empty => Ok(old),
        }
    }
    .boxed_local()
}

/// R6: Element reconciliation.
async fn reconcile_element(
    ctx: &mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    parent_view_id: ViewId,
    index: usize,
) -> Result<NodeKey, ReconcileError> {
    // Both scores are checked against `new` in its original, as-received
    // form: `structural_similarity` keys its memo on `new`'s own address
    // (spec §4.3), so it must see the actual template the caller passed in,
    // not a reconstructed stand-in.
    let props_score = {
        let NodeTemplate::Element { props: new_props, .. } = &new else {
            unreachable!("dispatched as Element");
        };
        let Node::Element(old_el) = &ctx.arena[old] else {
            unreachable!("dispatched as Element");
        };
        crate::similarity::props_similarity(&old_el.props, new_props)
    };
    if props_score < 0.5 {
        return replace(ctx, old, new, parent_view_id, index).await;
    }

    let structural_score = ctx.similarity.structural_similarity(ctx.arena, old, &new);
    if structural_score < 0.3 {
        return replace(ctx, old, new, parent_view_id, index).await;
    }

    let NodeTemplate::Element { type_name: _, key: _, props: new_props, children: new_children } = new else {
        unreachable!("dispatched as Element");
    };

    let view_id = match &ctx.arena[old] {
        Node::Element(n) => n.view_id.expect("live Element always has a view_id"),
        _ => unreachable!(),
    };

    let changed = {
        let old_props = match &ctx.arena[old] {
            Node::Element(n) => &n.props,
            _ => unreachable!(),
        };
        ctx.props_differ.diff(old_props, &new_props)
    };

    let new_event_types: FxHashSet<String> = new_props
        .iter()
        .filter(|(_, v)| v.is_handler())
        .map(|(k, _)| k.clone())
        .collect();

    let (to_add, to_remove) = {
        let old_types = match &ctx.arena[old] {
            Node::Element(n) => &n.listening,
            _ => unreachable!(),
        };
        let to_add: Vec<String> = new_event_types.difference(old_types).cloned().collect();
        let to_remove: Vec<String> = old_types.difference(&new_event_types).cloned().collect();
        (to_add, to_remove)
    };

    if !to_remove.is_empty() {
        ctx.effects.push_update(BridgeEffect::RemoveEventListeners { view_id, types: to_remove });
    }
    if !to_add.is_empty() {
        ctx.effects.push_update(BridgeEffect::AddEventListeners { view_id, types: to_add });
    }
    if !changed.is_empty() {
        ctx.effects.push_update(BridgeEffect::UpdateView { view_id, changed_props: changed });
    }

    if let Node::Element(n) = &mut ctx.arena[old] {
        n.props = new_props;
        n.listening = new_event_types;
    }

    let old_children: Vec<NodeKey> = match &ctx.arena[old] {
        Node::Element(n) => n.children.to_vec(),
        _ => unreachable!(),
    };
    let reconciled_children = child_list::reconcile_children(ctx, view_id, old, old_children, new_children).await?;
    if let Node::Element(n) = &mut ctx.arena[old] {
        n.children = Children::from_vec(reconciled_children);
    }

    Ok(old)
}

/// R7: Component reconciliation, same runtime type, distinct instances.
async fn reconcile_stateful(
    ctx: &mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    parent_view_id: ViewId,
    index: usize,
) -> Result<NodeKey, ReconcileError> {
    let NodeTemplate::Stateful { instance: new_instance, .. } = new else {
        unreachable!("dispatched as Stateful");
    };

    let old_rendered = match &ctx.arena[old] {
        Node::Stateful(n) => n.rendered,
        _ => unreachable!(),
    };
    let old_content_view_id = match &ctx.arena[old] {
        Node::Stateful(n) => n.content_view_id,
        _ => unreachable!(),
    };

    let new_template = guarded_render(ctx, &new_instance)?;

    let old_rendered = old_rendered.expect("a mounted component always has a rendered subtree");
    let new_rendered = reconcile(ctx, old_rendered, new_template, parent_view_id, index).await?;
    let new_content_view_id = ctx.arena[new_rendered].effective_view_id().or(old_content_view_id);

    if let Node::Stateful(n) = &mut ctx.arena[old] {
        n.instance = new_instance;
        n.rendered = Some(new_rendered);
        n.content_view_id = new_content_view_id;
    }

    // Safety-net re-verification (spec §4.4 R7): if the descendant work
    // overwrote the registry binding for this view-id, restore it.
    if let Some(view_id) = new_content_view_id {
        if ctx.registry.lookup(view_id) != Some(new_rendered) {
            ctx.registry.bind(view_id, new_rendered);
        }
    }

    Ok(old)
}

async fn reconcile_stateless(
    ctx: &mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    parent_view_id: ViewId,
    index: usize,
) -> Result<NodeKey, ReconcileError> {
    let NodeTemplate::Stateless { component: new_component, .. } = new else {
        unreachable!("dispatched as Stateless");
    };

    let old_rendered = match &ctx.arena[old] {
        Node::Stateless(n) => n.rendered,
        _ => unreachable!(),
    }
    .expect("a mounted component always has a rendered subtree");

    let new_template = call_render_stateless(&new_component)?;
    let new_rendered = reconcile(ctx, old_rendered, new_template, parent_view_id, index).await?;
    let new_content_view_id = ctx.arena[new_rendered].effective_view_id();

    if let Node::Stateless(n) = &mut ctx.arena[old] {
        n.component = new_component;
        n.rendered = Some(new_rendered);
        n.content_view_id = new_content_view_id;
    }

    Ok(old)
}

/// R8: Fragment reconciliation.
async fn reconcile_fragment(
    ctx: &mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    _parent_view_id: ViewId,
    _index: usize,
) -> Result<NodeKey, ReconcileError> {
    let NodeTemplate::Fragment { children: new_children, .. } = new else {
        unreachable!("dispatched as Fragment");
    };

    let parent_view_id = find_parent_view_id(ctx, old);
    let old_children: Vec<NodeKey> = match &ctx.arena[old] {
        Node::Fragment(n) => n.children.to_vec(),
        _ => unreachable!(),
    };

    let reconciled = child_list::reconcile_children(ctx, parent_view_id, old, old_children, new_children).await?;
    let child_view_ids: smallvec::SmallVec<[ViewId; 4]> =
        reconciled.iter().filter_map(|k| ctx.arena[*k].effective_view_id()).collect();

    if let Node::Fragment(n) = &mut ctx.arena[old] {
        n.children = Children::from_vec(reconciled);
        n.child_view_ids = child_view_ids;
    }

    Ok(old)
}

/// spec §4.12: replacement is the shortcut path when nodes are too
/// dissimilar to merge, or when kind/runtime-type/key force it.
pub async fn replace(
    ctx: &mut ReconcileCtx<'_>,
    old: NodeKey,
    new: NodeTemplate,
    parent_view_id: ViewId,
    index: usize,
) -> Result<NodeKey, ReconcileError> {
    let old_view_id = ctx.arena[old].effective_view_id();
    let old_parent = ctx.arena[old].parent();

    // Step 3: view-id reuse decision, computed before `old` is torn down.
    let element_type_changed = matches!(
        (&ctx.arena[old], &new),
        (Node::Element(o), NodeTemplate::Element { type_name, .. }) if &o.type_name != type_name
    );
    let component_to_fragment =
        matches!(ctx.arena[old], Node::Stateful(_) | Node::Stateless(_)) && matches!(new, NodeTemplate::Fragment { .. });
    let reused_view_id = if element_type_changed || component_to_fragment {
        None
    } else {
        old_view_id
    };

    // Step 1: dispose old (shallow bookkeeping on `old` itself; descendants'
    // registry/arena cleanup is swept recursively right here since this
    // Rust arena, unlike the source's GC'd heap, must reclaim slots
    // explicitly — see DESIGN.md for why this differs from a literal
    // reading of "skip recursive child disposal").
    dispose_subtree(ctx, old);

    // Step 5 (queued before step 6's render, so within the batch the host
    // removes the old view before the new one is created): only one
    // delete_view for the subtree root; the bridge recurses natively.
    if let Some(view_id) = old_view_id {
        ctx.effects.push_deletion(BridgeEffect::DeleteView { view_id });
    }

    // Step 6: render the new subtree, reusing the old view-id when decided
    // above (render_to_native only honors this at the top level; nested
    // children always get fresh ids).
    let (new_key, _new_view_id) =
        render_to_native_with_id(ctx, new, old_parent, Some(parent_view_id), Some(index), reused_view_id).await?;

    Ok(new_key)
}

fn guarded_render(
    ctx: &mut ReconcileCtx,
    instance: &crate::node::ComponentHandle,
) -> Result<NodeTemplate, ReconcileError> {
    let id = ComponentId::of(instance);
    if !ctx.render_in_flight.insert(id) {
        return Err(ReconcileError::InfiniteRender {
            diagnosis: "render_to_native re-entered on a component already rendering; likely a state \
                        update inside render(), an invalid key causing repeated remounts, or a circular \
                        render dependency"
                .to_string(),
        });
    }
    let result = call_render(instance);
    ctx.render_in_flight.remove(&id);
    result
}

/// E2: `render()` is caller code and may panic. Rust has no checked-exception
/// equivalent to the source's `try`/`catch` around a render call, so this is
/// the idiomatic substitute — `catch_unwind` converts the panic into a
/// `ReconcileError` the caller can hand to an `ErrorBoundary` instead of
/// taking the whole batch down with it.
fn call_render(instance: &crate::node::ComponentHandle) -> Result<NodeTemplate, ReconcileError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| instance.borrow().render()))
        .map_err(|payload| ReconcileError::RenderThrew { message: panic_message(payload) })
}

fn call_render_stateless(component: &Rc<dyn crate::node::StatelessComponent>) -> Result<NodeTemplate, ReconcileError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| component.render()))
        .map_err(|payload| ReconcileError::RenderThrew { message: panic_message(payload) })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "render() panicked with a non-string payload".to_string()
    }
}

/// spec §4.8: a component re-rendering because *its own* state changed, not
/// because a parent passed it a new template. Distinct from
/// [`reconcile_stateful`], which only runs when a parent's render produced a
/// new `Stateful` template at this position — R1's fast path means that path
/// never re-renders an unchanged instance, so this is the only route by
/// which a settled component re-enters `render()` on its own.
pub async fn update_component_by_id(ctx: &mut ReconcileCtx<'_>, node: NodeKey) -> Result<(), ReconcileError> {
    let (instance, old_rendered) = match &ctx.arena[node] {
        Node::Stateful(n) => (n.instance.clone(), n.rendered),
        _ => return Ok(()),
    };
    let Some(old_rendered) = old_rendered else {
        return Ok(());
    };

    instance.borrow_mut().prepare_for_render();
    let new_template = call_render(&instance)?;

    let parent_view_id = find_parent_view_id(ctx, node);
    let index = find_node_index_in_parent(ctx, node);
    let new_rendered = reconcile(ctx, old_rendered, new_template, parent_view_id, index).await?;
    let content_view_id = ctx.arena[new_rendered].effective_view_id();

    if let Node::Stateful(n) = &mut ctx.arena[node] {
        n.rendered = Some(new_rendered);
        n.content_view_id = content_view_id;
    }

    // Same safety net as R7: restore the registry binding if a descendant
    // stomped on it.
    if let Some(view_id) = content_view_id {
        if ctx.registry.lookup(view_id) != Some(new_rendered) {
            ctx.registry.bind(view_id, new_rendered);
        }
    }

    ctx.effects.push_immediate_lifecycle(LifecycleEffect::DidUpdate(instance));
    Ok(())
}

/// spec §4.9. Materializes `template` into a fresh arena subtree, emitting
/// the bridge effects and lifecycle calls that go along with first mount.
///
/// Boxed for the same reason as [`reconcile`]: this function recurses into
/// itself for every Element/Fragment child.
pub fn render_to_native<'ctx>(
    ctx: &'ctx mut ReconcileCtx<'_>,
    template: NodeTemplate,
    parent: Option<NodeKey>,
    parent_view_id: Option<ViewId>,
    index: Option<usize>,
) -> LocalBoxFuture<'ctx, Result<(NodeKey, Option<ViewId>), ReconcileError>> {
    render_to_native_with_id(ctx, template, parent, parent_view_id, index, None)
}

/// As [`render_to_native`], but lets the top-level Element reuse a
/// specific view-id instead of allocating one (spec §4.12 step 3). Only
/// meaningful for the outermost call; recursive child calls always pass
/// `None`, since reuse is a same-position swap concept, not a subtree one.
fn render_to_native_with_id<'ctx>(
    ctx: &'ctx mut ReconcileCtx<'_>,
    template: NodeTemplate,
    parent: Option<NodeKey>,
    parent_view_id: Option<ViewId>,
    index: Option<usize>,
    forced_view_id: Option<ViewId>,
) -> LocalBoxFuture<'ctx, Result<(NodeKey, Option<ViewId>), ReconcileError>> {
    async move {
        match template {
            NodeTemplate::Element { type_name, key, props, children } => {
                let view_id = forced_view_id.unwrap_or_else(|| ctx.registry.alloc_view_id());
                let node_key = ctx.arena.insert(Node::Element(ElementNode {
                    type_name: type_name.clone(),
                    key,
                    props: props.clone(),
                    children: Children::new(),
                    view_id: Some(view_id),
                    parent,
                    listening: FxHashSet::default(),
                }));
                ctx.registry.bind(view_id, node_key);
                ctx.effects.push_placement(BridgeEffect::CreateView {
                    view_id,
                    type_name,
                    props: props.clone(),
                });
                if let Some(pvid) = parent_view_id {
                    ctx.effects.push_placement(BridgeEffect::AttachView {
                        child: view_id,
                        parent: pvid,
                        index: index.unwrap_or(0),
                    });
                }
                let event_types: FxHashSet<String> =
                    props.iter().filter(|(_, v)| v.is_handler()).map(|(k, _)| k.clone()).collect();
                if !event_types.is_empty() {
                    ctx.effects.push_placement(BridgeEffect::AddEventListeners {
                        view_id,
                        types: event_types.iter().cloned().collect(),
                    });
                }

                let mut child_keys = Children::new();
                let mut child_view_ids: Vec<ViewId> = Vec::new();
                for (i, child_template) in children.into_iter().enumerate() {
                    let (child_key, child_vid) =
                        render_to_native(ctx, child_template, Some(node_key), Some(view_id), Some(i)).await?;
                    child_keys.push(child_key);
                    if let Some(v) = child_vid {
                        child_view_ids.push(v);
                    }
                    if ctx.note_child_processed() {
                        tokio::task::yield_now().await;
                    }
                }
                if !child_view_ids.is_empty() {
                    ctx.effects.push_placement(BridgeEffect::SetChildren { parent: view_id, children: child_view_ids });
                }
                if let Node::Element(n) = &mut ctx.arena[node_key] {
                    n.children = child_keys;
                    n.listening = event_types;
                }
                Ok((node_key, Some(view_id)))
            }
            NodeTemplate::Stateful { key, instance } => {
                let node_key = ctx.arena.insert(Node::Stateful(StatefulNode {
                    key,
                    runtime_type: instance.borrow().runtime_type(),
                    instance: instance.clone(),
                    rendered: None,
                    content_view_id: None,
                    parent,
                    mounted: false,
                }));
                let child_template = guarded_render(ctx, &instance)?;
                let (child_key, child_vid) =
                    render_to_native(ctx, child_template, Some(node_key), parent_view_id, index).await?;
                if let Node::Stateful(n) = &mut ctx.arena[node_key] {
                    n.rendered = Some(child_key);
                    n.content_view_id = child_vid;
                    n.mounted = true;
                }
                ctx.effects.push_immediate_lifecycle(LifecycleEffect::DidMount(instance));
                Ok((node_key, child_vid))
            }
            NodeTemplate::Stateless { key, component } => {
                let node_key = ctx.arena.insert(Node::Stateless(StatelessNode {
                    key,
                    runtime_type: component.runtime_type(),
                    component: component.clone(),
                    rendered: None,
                    content_view_id: None,
                    parent,
                    mounted: false,
                }));
                let child_template = call_render_stateless(&component)?;
                let (child_key, child_vid) =
                    render_to_native(ctx, child_template, Some(node_key), parent_view_id, index).await?;
                if let Node::Stateless(n) = &mut ctx.arena[node_key] {
                    n.rendered = Some(child_key);
                    n.content_view_id = child_vid;
                    n.mounted = true;
                }
                Ok((node_key, child_vid))
            }
            NodeTemplate::Fragment { key, children } => {
                let node_key = ctx.arena.insert(Node::Fragment(FragmentNode {
                    key,
                    children: Children::new(),
                    child_view_ids: smallvec::SmallVec::new(),
                    parent,
                    mounted: true,
                }));
                let mut child_keys = Children::new();
                let mut child_view_ids: smallvec::SmallVec<[ViewId; 4]> = smallvec::SmallVec::new();
                for (i, child_template) in children.into_iter().enumerate() {
                    let (child_key, child_vid) = render_to_native(
                        ctx,
                        child_template,
                        Some(node_key),
                        parent_view_id,
                        index.map(|base| base + i),
                    )
                    .await?;
                    child_keys.push(child_key);
                    if let Some(v) = child_vid {
                        child_view_ids.push(v);
                    }
                    if ctx.note_child_processed() {
                        tokio::task::yield_now().await;
                    }
                }
                if let Node::Fragment(n) = &mut ctx.arena[node_key] {
                    n.children = child_keys;
                    n.child_view_ids = child_view_ids;
                }
                Ok((node_key, None))
            }
            NodeTemplate::Empty => {
                let node_key = ctx.arena.insert(Node::Empty(EmptyNode { parent }));
                Ok((node_key, None))
            }
        }
    }
    .boxed_local()
}

/// spec §4.10. A single, uniformly-used walk rule (the spec's Open
/// Questions note two subtly different call sites existed in the source;
/// this implementation keeps exactly one).
pub fn find_parent_view_id(ctx: &ReconcileCtx, node: NodeKey) -> ViewId {
    let mut current = ctx.arena[node].parent();
    let callee_view_id = ctx.arena[node].effective_view_id();

    while let Some(ancestor_key) = current {
        match &ctx.arena[ancestor_key] {
            Node::Element(n) => {
                if let Some(vid) = n.view_id {
                    if Some(vid) != callee_view_id {
                        return vid;
                    }
                }
                current = n.parent;
            }
            Node::Stateful(n) => {
                if let Some(vid) = n.content_view_id {
                    if Some(vid) != callee_view_id {
                        return vid;
                    }
                }
                current = n.parent;
            }
            Node::Stateless(n) => {
                if let Some(vid) = n.content_view_id {
                    if Some(vid) != callee_view_id {
                        return vid;
                    }
                }
                current = n.parent;
            }
            Node::Fragment(n) => current = n.parent,
            Node::Empty(n) => current = n.parent,
        }
    }

    ViewId::ROOT
}

/// spec §4.11.
pub fn find_node_index_in_parent(ctx: &ReconcileCtx, node: NodeKey) -> usize {
    let Some(parent_key) = ctx.arena[node].parent() else {
        return 0;
    };
    match &ctx.arena[parent_key] {
        Node::Element(n) => n.children.iter().position(|k| *k == node).unwrap_or(0),
        Node::Fragment(n) => n.children.iter().position(|k| *k == node).unwrap_or(0),
        Node::Stateful(_) | Node::Stateless(_) => find_node_index_in_parent(ctx, parent_key),
        Node::Empty(_) => 0,
    }
}

/// Recursively tears down a disposed subtree: queues `componentWillUnmount`
/// for every stateful component found, unbinds every Element's view-id from
/// the registry, and frees every arena slot. Only one `delete_view` is ever
/// queued by the caller, for the subtree root — the bridge recurses
/// natively (spec §4.12 step 1 note). Synchronous and not subject to the
/// child-yield cadence: it is bookkeeping-only disposal, not the
/// render/reconcile path §5's anti-starvation guidance targets.
pub fn dispose_subtree(ctx: &mut ReconcileCtx, node: NodeKey) {
    let children: Vec<NodeKey> = match &ctx.arena[node] {
        Node::Element(n) => n.children.to_vec(),
        Node::Fragment(n) => n.children.to_vec(),
        Node::Stateful(n) => n.rendered.into_iter().collect(),
        Node::Stateless(n) => n.rendered.into_iter().collect(),
        Node::Empty(_) => Vec::new(),
    };
    for child in children {
        dispose_subtree(ctx, child);
    }

    if let Some(removed) = ctx.arena.remove(node) {
        match removed {
            Node::Element(n) => {
                if let Some(view_id) = n.view_id {
                    ctx.registry.unbind(view_id);
                }
            }
            Node::Stateful(n) => {
                let id = ComponentId::of(&n.instance);
                ctx.render_counts.remove(&id);
                ctx.render_in_flight.remove(&id);
                ctx.effects.push_immediate_lifecycle(LifecycleEffect::WillUnmount(n.instance));
            }
            Node::Stateless(_) | Node::Fragment(_) | Node::Empty(_) => {}
        }
    }
}
