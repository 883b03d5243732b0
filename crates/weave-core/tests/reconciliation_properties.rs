//! P1 (id stability), P2 (id uniqueness), P3 (parent-first), P5 (idempotent
//! reconcile) — spec §8.

mod common;

use common::*;
use weave_bridge::BridgeCall;

#[test]
fn p1_reconciled_element_keeps_its_view_id() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    rt.block_on(async {
        engine.mount(root(vec![text("a")])).await.unwrap();
        engine.bridge().clear();

        // Same shape, changed leaf text: must reconcile in place, never
        // tear down and recreate the Text view.
        engine.mount(root(vec![text("b")])).await.unwrap();
    });

    let calls = engine.bridge().calls();
    assert!(
        !calls.iter().any(|c| matches!(c, BridgeCall::CreateView { .. }) || matches!(c, BridgeCall::DeleteView { .. })),
        "reconciling an unchanged shape must not create or delete any view, got {calls:?}"
    );
    assert!(calls.iter().any(|c| matches!(c, BridgeCall::UpdateView { .. })));
}

#[test]
fn p2_every_live_view_id_is_unique_and_only_elements_are_registered() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    rt.block_on(async {
        engine
            .mount(root(vec![text("a"), text("b"), text("c")]))
            .await
            .unwrap();
    });

    // Root + three Text leaves: four live Elements, four distinct view-ids.
    assert_eq!(engine.live_view_count(), 4);
    assert!(engine.last_registry_repairs().is_empty(), "no E6 repair should have been necessary");
}

#[test]
fn p3_every_attached_child_names_a_registered_parent_and_a_defined_index() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    rt.block_on(async {
        engine.mount(root(vec![text("a"), text("b")])).await.unwrap();
    });

    let calls = engine.bridge().calls();
    let root_id = engine.root_view_id().expect("root must be live after mount");

    let attaches: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            BridgeCall::AttachView { child, parent, index } => Some((*child, *parent, *index)),
            _ => None,
        })
        .collect();

    // The two Text children attach under the Root view, at indices 0 and 1.
    let children_of_root: Vec<_> = attaches.iter().filter(|(_, p, _)| *p == root_id).collect();
    assert_eq!(children_of_root.len(), 2);
    let mut indices: Vec<usize> = children_of_root.iter().map(|(_, _, i)| *i).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1]);

    // The root itself is attached to the host root (ViewId::ROOT).
    assert!(attaches.iter().any(|(child, parent, _)| *child == root_id && parent.is_root()));
}

#[test]
fn p5_reconciling_an_identical_tree_issues_no_mutations() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    rt.block_on(async {
        engine
            .mount(root(vec![text("a"), leaf("Image")]))
            .await
            .unwrap();
        engine.bridge().clear();

        // Same shape, same props, same children: a no-op reconciliation.
        engine
            .mount(root(vec![text("a"), leaf("Image")]))
            .await
            .unwrap();
    });

    let calls = engine.bridge().calls();
    let non_batch_marker: Vec<_> = calls
        .iter()
        .filter(|c| !matches!(c, BridgeCall::BeginBatch | BridgeCall::CommitBatch))
        .collect();
    assert!(non_batch_marker.is_empty(), "expected zero mutations, got {non_batch_marker:?}");
}
