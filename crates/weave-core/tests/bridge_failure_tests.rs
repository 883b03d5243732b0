//! E1 `BridgeFailure` (spec §7): a failed `create_view` abandons only the
//! view it was for, not its ancestors or unrelated siblings.

mod common;

use common::*;
use weave_bridge::{BridgeCall, ViewId};

#[test]
fn e1_a_failed_create_view_abandons_only_its_own_subtree() {
    let rt = rt();
    let (mut engine, _clock) = new_engine();

    // Root allocates ViewId(1) before its children; "a" and "b" then
    // allocate ViewId(2) and ViewId(3) in render order.
    engine.bridge().fail_next_create(ViewId::new(2));

    rt.block_on(async {
        engine
            .mount(root(vec![text("a"), text("b")]))
            .await
            .expect("a bridge effect failure must not fail the whole mount");
    });

    let calls = engine.bridge().calls();
    let root_id = ViewId::new(1);
    let failed_id = ViewId::new(2);
    let sibling_id = ViewId::new(3);

    assert!(
        calls.iter().any(|c| matches!(c, BridgeCall::CreateView { view_id, .. } if *view_id == root_id)),
        "the root's own create_view must still succeed"
    );
    assert!(
        !calls.iter().any(|c| matches!(c, BridgeCall::CreateView { view_id, .. } if *view_id == failed_id)),
        "the failing view's create_view must not be recorded as having succeeded"
    );
    assert!(
        calls.iter().any(|c| matches!(c, BridgeCall::CreateView { view_id, .. } if *view_id == sibling_id)),
        "an unrelated sibling must still be created"
    );

    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, BridgeCall::AttachView { child, .. } if *child == failed_id)),
        "a view that failed to create must never be attached"
    );
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, BridgeCall::AttachView { child, parent, .. } if *child == sibling_id && *parent == root_id)),
        "the unrelated sibling must still be attached to the root"
    );

    let set_children = calls
        .iter()
        .find_map(|c| match c {
            BridgeCall::SetChildren { parent, children } if *parent == root_id => Some(children.clone()),
            _ => None,
        })
        .expect("root's set_children must still be issued");
    assert_eq!(
        set_children,
        vec![sibling_id],
        "set_children must drop the abandoned child rather than reference a view that was never created"
    );

    assert!(calls.iter().any(|c| matches!(c, BridgeCall::CommitBatch)));
    assert!(!calls.iter().any(|c| matches!(c, BridgeCall::CancelBatch)));
}
