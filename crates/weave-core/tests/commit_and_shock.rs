//! P4 (atomic commit), P9 (structural shock preserves nothing), P10
//! (replacement orders delete before create) — spec §8.

mod common;

use common::*;
use weave_bridge::BridgeCall;

#[test]
fn p4_a_fatal_batch_is_cancelled_and_leaves_the_tree_unchanged() {
    let rt = rt();
    let (mut engine, clock) = new_engine();
    let flaky = panics_after_first_render();

    rt.block_on(async {
        engine
            .mount(weave_core::NodeTemplate::Stateful { key: None, instance: flaky.clone() })
            .await
            .unwrap();
    });

    let root_before = engine.root_view_id();
    let live_before = engine.live_view_count();
    engine.bridge().clear();

    let result = rt.block_on(async {
        engine.schedule_update(&flaky);
        clock.advance(200); // well past Normal's debounce window
        engine.poll().await
    });

    assert!(result.is_err(), "a render() panic with no ErrorBoundary must be fatal to the batch");

    let calls = engine.bridge().calls();
    assert!(calls.iter().any(|c| matches!(c, BridgeCall::CancelBatch)));
    assert!(
        !calls.iter().any(|c| matches!(c, BridgeCall::CommitBatch)),
        "a cancelled batch must never commit"
    );
    assert!(
        !calls.iter().any(|c| matches!(c, BridgeCall::UpdateView { .. })),
        "no partial effect should have been committed"
    );

    // The committed tree is exactly what it was before the failed batch.
    assert_eq!(engine.root_view_id(), root_before);
    assert_eq!(engine.live_view_count(), live_before);
}

#[test]
fn p9_structural_shock_retires_every_previous_view_id() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    let old_root_id = rt.block_on(async {
        engine
            .mount(root(vec![text("a"), text("b")]))
            .await
            .unwrap();
        engine.root_view_id().unwrap()
    });
    engine.bridge().clear();

    let new_root_id = rt.block_on(async {
        // A different root runtime type unconditionally trips the R3/§4.7
        // structural-shock check, independent of any similarity threshold.
        engine
            .mount(weave_core::NodeTemplate::Element {
                type_name: "CompletelyDifferentWidget".to_string(),
                key: None,
                props: weave_bridge::PropMap::default(),
                children: vec![leaf("Something")],
            })
            .await
            .unwrap();
        engine.root_view_id().unwrap()
    });

    assert_ne!(old_root_id, new_root_id, "view-ids are never reused (I5)");

    let calls = engine.bridge().calls();
    let deleted: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            BridgeCall::DeleteView { view_id } => Some(*view_id),
            _ => None,
        })
        .collect();
    assert!(deleted.contains(&old_root_id), "the old root's view must be torn down");
    assert!(
        !deleted.contains(&new_root_id),
        "the freshly-created root must not itself be deleted"
    );
}

#[test]
fn p10_replacement_deletes_before_it_creates() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    rt.block_on(async {
        engine.mount(root(vec![leaf("Text")])).await.unwrap();
    });
    engine.bridge().clear();

    rt.block_on(async {
        // Same root, child swapped to an unrelated type: §4.5.3 forces a
        // same-position replace, not a reconcile.
        engine.mount(root(vec![leaf("Button")])).await.unwrap();
    });

    let calls = engine.bridge().calls();
    let delete_at = calls.iter().position(|c| matches!(c, BridgeCall::DeleteView { .. }));
    let create_at = calls.iter().position(|c| matches!(c, BridgeCall::CreateView { .. }));
    let (delete_at, create_at) = (delete_at.expect("expected a delete"), create_at.expect("expected a create"));
    assert!(delete_at < create_at, "delete_view must precede create_view within the replacing batch");
}
