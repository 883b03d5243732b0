use crate::ctx::ReconcileCtx;
use crate::effects::BridgeEffect;
use crate::error::ReconcileError;
use crate::node::{Node, NodeKey, NodeTemplate};
use crate::reconciler::{dispose_subtree, reconcile, render_to_native};
use rustc_hash::{FxHashMap, FxHashSet};
use weave_bridge::ViewId;

/// Keyed- or unkeyed-list diff of one parent's children (spec §4.5), called
/// from `reconcile_element`/`reconcile_fragment` with the parent's own
/// `view_id` (or, for a Fragment, its host parent's) already resolved.
///
/// C1: key detection. If every entry in `new_children` carries a
/// user-assigned key, the keyed algorithm runs; otherwise the simple
/// two-pointer matcher does.
pub async fn reconcile_children(
    ctx: &mut ReconcileCtx<'_>,
    parent_view_id: ViewId,
    parent: NodeKey,
    old_children: Vec<NodeKey>,
    new_children: Vec<NodeTemplate>,
) -> Result<Vec<NodeKey>, ReconcileError> {
    let all_keyed = new_children.iter().all(|c| c.key().is_some());
    if all_keyed {
        reconcile_keyed(ctx, parent_view_id, parent, old_children, new_children).await
    } else {
        reconcile_unkeyed(ctx, parent_view_id, parent, old_children, new_children).await
    }
}

/// A child's matching identity: the user key if present, else
/// `"{index}:{runtime_type}"` (spec §4.5.1).
fn effective_key(key: Option<&str>, index: usize, runtime_type: &str) -> String {
    match key {
        Some(k) => format!("k:{k}"),
        None => format!("i:{index}:{runtime_type}"),
    }
}

/// Longest increasing subsequence of `arr`, skipping entries equal to `-1`
/// (a freshly-created position with no old-side counterpart). Returns the
/// *indices into `arr`* that form the subsequence — those positions are
/// already in relatively correct order and need no move; every other
/// matched position gets a detach/re-attach pair.
///
/// Direct port of the patience-sorting/binary-search algorithm the teacher
/// uses to minimize DOM moves during keyed reconciliation, generalized from
/// `NodeId` tails to the `isize` old-index encoding this arena uses.
fn longest_increasing_subsequence(arr: &[isize]) -> Vec<usize> {
    let mut predecessors: Vec<isize> = vec![-1; arr.len()];
    // tails[k] = index into `arr` of the smallest tail value of an
    // increasing subsequence of length k+1 found so far.
    let mut tails: Vec<usize> = Vec::new();

    for i in 0..arr.len() {
        if arr[i] == -1 {
            continue;
        }
        if tails.is_empty() || arr[*tails.last().unwrap()] < arr[i] {
            if let Some(&last) = tails.last() {
                predecessors[i] = last as isize;
            }
            tails.push(i);
            continue;
        }
        // Binary search tails for the first tail whose value is >= arr[i].
        let mut lo = 0usize;
        let mut hi = tails.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            if arr[tails[mid]] < arr[i] {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo > 0 {
            predecessors[i] = tails[lo - 1] as isize;
        }
        tails[lo] = i;
    }

    let mut res = vec![0usize; tails.len()];
    if let Some(&last) = tails.last() {
        let mut k = last;
        for slot in res.iter_mut().rev() {
            *slot = k;
            if predecessors[k] < 0 {
                break;
            }
            k = predecessors[k] as usize;
        }
    }
    res
}

/// §4.5.1. Matches new children to old by key, then moves the minimum
/// number of already-matched nodes: an LIS over the matched old-indices
/// identifies which positions are already in relatively correct relative
/// order (no move needed); everything matched but outside that subsequence
/// gets a detach/re-attach pair.
async fn reconcile_keyed(
    ctx: &mut ReconcileCtx<'_>,
    parent_view_id: ViewId,
    parent: NodeKey,
    old_children: Vec<NodeKey>,
    new_children: Vec<NodeTemplate>,
) -> Result<Vec<NodeKey>, ReconcileError> {
    let mut old_by_key: FxHashMap<String, (NodeKey, usize)> = FxHashMap::default();
    for (i, &old_key) in old_children.iter().enumerate() {
        let node = &ctx.arena[old_key];
        let k = effective_key(node.key(), i, node.runtime_type());
        old_by_key.insert(k, (old_key, i));
    }

    let mut result: Vec<NodeKey> = Vec::with_capacity(new_children.len());
    let mut matched: FxHashSet<NodeKey> = FxHashSet::default();
    let mut changed = false;
    // source[i] = the old index the new position `i` matched, or -1 if `i`
    // is a freshly-created position (LIS input, spec-grounded in the
    // teacher's `calculate_lis`/`diff_children` move-skip walk).
    let mut source: Vec<isize> = Vec::with_capacity(new_children.len());

    for (i, new_child) in new_children.into_iter().enumerate() {
        let rt = new_child.runtime_type().to_string();
        let key = effective_key(new_child.key(), i, &rt);

        if let Some(&(old_key, old_index)) = old_by_key.get(&key) {
            matched.insert(old_key);
            let reconciled = reconcile(ctx, old_key, new_child, parent_view_id, i).await?;
            if old_index != i {
                changed = true;
            }
            source.push(old_index as isize);
            result.push(reconciled);
        } else {
            changed = true;
            let (new_key, _) = render_to_native(ctx, new_child, Some(parent), Some(parent_view_id), Some(i)).await?;
            source.push(-1);
            result.push(new_key);
        }

        if ctx.note_child_processed() {
            tokio::task::yield_now().await;
        }
    }

    let keep: FxHashSet<usize> = longest_increasing_subsequence(&source).into_iter().collect();
    for (i, &old_index) in source.iter().enumerate() {
        if old_index < 0 || keep.contains(&i) {
            continue;
        }
        if let Some(view_id) = ctx.arena[result[i]].effective_view_id() {
            // "detach + re-attach at index" (spec §4.5.1), emitted only for
            // matched positions outside the LIS.
            ctx.effects.push_placement(BridgeEffect::DetachView { child: view_id });
            ctx.effects.push_placement(BridgeEffect::AttachView { child: view_id, parent: parent_view_id, index: i });
        }
    }

    for (_, (old_key, _)) in old_by_key {
        if !matched.contains(&old_key) {
            changed = true;
            unmount_child(ctx, old_key);
            if ctx.note_child_processed() {
                tokio::task::yield_now().await;
            }
        }
    }

    emit_set_children_if_complete(ctx, parent_view_id, changed, &result);
    Ok(result)
}

/// §4.5.2: a two-pointer greedy matcher. At each `(i_old, i_new)` pair,
/// decide to reconcile in place, treat the new side as an insertion (found
/// by looking ahead for a new-side match of `old[i_old]`), treat the old
/// side as a removal (found by looking ahead for an old-side match of
/// `new[i_new]`), or replace in place when neither lookahead finds one.
async fn reconcile_unkeyed(
    ctx: &mut ReconcileCtx<'_>,
    parent_view_id: ViewId,
    parent: NodeKey,
    old_children: Vec<NodeKey>,
    new_children: Vec<NodeTemplate>,
) -> Result<Vec<NodeKey>, ReconcileError> {
    let mut new_slots: Vec<Option<NodeTemplate>> = new_children.into_iter().map(Some).collect();
    let mut result: Vec<NodeKey> = Vec::with_capacity(new_slots.len());
    let mut changed = false;

    let mut i_old = 0usize;
    let mut i_new = 0usize;

    while i_old < old_children.len() && i_new < new_slots.len() {
        let old_key = old_children[i_old];

        if templates_match(ctx, old_key, new_slots[i_new].as_ref().unwrap()) {
            let template = new_slots[i_new].take().unwrap();
            let reconciled = reconcile(ctx, old_key, template, parent_view_id, i_new).await?;
            result.push(reconciled);
            i_old += 1;
            i_new += 1;
            if ctx.note_child_processed() {
                tokio::task::yield_now().await;
            }
            continue;
        }

        let insertion_at = ((i_new + 1)..new_slots.len())
            .find(|&j| templates_match(ctx, old_key, new_slots[j].as_ref().unwrap()));
        let removal_at = ((i_old + 1)..old_children.len())
            .find(|&k| templates_match(ctx, old_children[k], new_slots[i_new].as_ref().unwrap()));

        let prefer_insertion = match (insertion_at, removal_at) {
            (Some(j), Some(k)) => (j - i_new) <= (k - i_old),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => {
                // Neither lookahead matched: replace in place.
                changed = true;
                let template = new_slots[i_new].take().unwrap();
                let replaced = crate::reconciler::replace(ctx, old_key, template, parent_view_id, i_new).await?;
                result.push(replaced);
                i_old += 1;
                i_new += 1;
                if ctx.note_child_processed() {
                    tokio::task::yield_now().await;
                }
                continue;
            }
        };

        if prefer_insertion {
            let j = insertion_at.unwrap();
            for idx in i_new..j {
                changed = true;
                let template = new_slots[idx].take().unwrap();
                let (key, _) = render_to_native(ctx, template, Some(parent), Some(parent_view_id), Some(idx)).await?;
                result.push(key);
                if ctx.note_child_processed() {
                    tokio::task::yield_now().await;
                }
            }
            i_new = j;
        } else {
            let k = removal_at.unwrap();
            for idx in i_old..k {
                changed = true;
                unmount_child(ctx, old_children[idx]);
                if ctx.note_child_processed() {
                    tokio::task::yield_now().await;
                }
            }
            i_old = k;
        }
    }

    while i_new < new_slots.len() {
        changed = true;
        let template = new_slots[i_new].take().unwrap();
        let (key, _) = render_to_native(ctx, template, Some(parent), Some(parent_view_id), Some(i_new)).await?;
        result.push(key);
        i_new += 1;
        if ctx.note_child_processed() {
            tokio::task::yield_now().await;
        }
    }
    while i_old < old_children.len() {
        changed = true;
        unmount_child(ctx, old_children[i_old]);
        i_old += 1;
        if ctx.note_child_processed() {
            tokio::task::yield_now().await;
        }
    }

    emit_set_children_if_complete(ctx, parent_view_id, changed, &result);
    Ok(result)
}

/// "Matches" for the unkeyed matcher (spec §4.5.2): same runtime type and
/// [`should_replace_at_same_position`] says no.
fn templates_match(ctx: &mut ReconcileCtx, old_key: NodeKey, new_template: &NodeTemplate) -> bool {
    if ctx.arena[old_key].runtime_type() != new_template.runtime_type() {
        return false;
    }
    !should_replace_at_same_position(ctx, old_key, new_template)
}

/// §4.5.3. Returns `true` when the pair is too dissimilar to reconcile in
/// place and should instead be replaced.
fn should_replace_at_same_position(ctx: &mut ReconcileCtx, old_key: NodeKey, new_template: &NodeTemplate) -> bool {
    let old_key_str = ctx.arena[old_key].key().map(|s| s.to_string());
    let old_runtime = ctx.arena[old_key].runtime_type().to_string();

    if let (Some(ok), Some(nk)) = (&old_key_str, new_template.key()) {
        if ok != nk {
            return true;
        }
    }
    if old_runtime != new_template.runtime_type() {
        return true;
    }

    let is_element_pair = matches!(ctx.arena[old_key], Node::Element(_)) && matches!(new_template, NodeTemplate::Element { .. });
    if is_element_pair {
        let props_score = {
            let Node::Element(old_el) = &ctx.arena[old_key] else {
                unreachable!("checked above")
            };
            let NodeTemplate::Element { props: new_props, .. } = new_template else {
                unreachable!("checked above")
            };
            crate::similarity::props_similarity(&old_el.props, new_props)
        };
        if props_score < 0.5 {
            return true;
        }
        let structural_score = ctx.similarity.structural_similarity(ctx.arena, old_key, new_template);
        if structural_score < 0.3 {
            return true;
        }
    }

    false
}

fn unmount_child(ctx: &mut ReconcileCtx, node_key: NodeKey) {
    if let Some(view_id) = ctx.arena[node_key].effective_view_id() {
        ctx.effects.push_deletion(BridgeEffect::DeleteView { view_id });
    }
    dispose_subtree(ctx, node_key);
}

/// "Emit `set_children` only when every slot has a view-id; otherwise skip
/// and log" (spec §4.5.1/§4.5.2, E3). Skipped entirely when nothing
/// reordered/created/removed, so idempotent reconciliation (P5) issues no
/// mutation for an unchanged list.
fn emit_set_children_if_complete(ctx: &mut ReconcileCtx, parent_view_id: ViewId, changed: bool, children: &[NodeKey]) {
    if !changed {
        return;
    }
    let mut view_ids = Vec::with_capacity(children.len());
    for &key in children {
        match ctx.arena[key].effective_view_id() {
            Some(vid) => view_ids.push(vid),
            None => {
                tracing::warn!(?parent_view_id, "E3 MissingViewId: skipping set_children, a child slot has no view-id");
                return;
            }
        }
    }
    ctx.effects.push_placement(BridgeEffect::SetChildren { parent: parent_view_id, children: view_ids });
}
