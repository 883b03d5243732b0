use rustc_hash::FxHashMap;
use weave_bridge::{Bridge, BridgeCall, MockBridge, Value, ViewId};

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

#[test]
fn records_calls_in_order() {
    let rt = rt();
    let mut bridge = MockBridge::new();

    rt.block_on(async {
        bridge.begin_batch().await;
        bridge
            .create_view(ViewId::new(1), "Text", &FxHashMap::default())
            .await;
        bridge.attach_view(ViewId::new(1), ViewId::ROOT, 0).await;
        bridge.commit_batch().await.unwrap();
    });

    let calls = bridge.calls();
    assert_eq!(calls[0], BridgeCall::BeginBatch);
    assert!(matches!(calls[1], BridgeCall::CreateView { .. }));
    assert!(matches!(calls[2], BridgeCall::AttachView { .. }));
    assert_eq!(calls[3], BridgeCall::CommitBatch);
}

#[test]
fn failing_create_reports_false_and_is_not_logged() {
    let rt = rt();
    let mut bridge = MockBridge::new();
    bridge.fail_next_create(ViewId::new(1));

    let ok = rt.block_on(bridge.create_view(ViewId::new(1), "Text", &FxHashMap::default()));
    assert!(!ok);
    assert!(bridge.calls().is_empty());
}

#[test]
fn handler_values_compare_by_identity() {
    let a = weave_bridge::EventHandler::new(|_| {});
    let b = a.clone();
    let c = weave_bridge::EventHandler::new(|_| {});
    assert_eq!(Value::Handler(a), Value::Handler(b));
    assert_ne!(
        Value::Handler(c.clone()),
        Value::Handler(weave_bridge::EventHandler::new(|_| {}))
    );
    let _ = c;
}
