use std::collections::BTreeMap;
use weave_worker::{diff_serialized, structural_fingerprint, SerializedNode, SerializedValue, WorkerChange, WorkerPool};

fn leaf(tag: &str) -> SerializedNode {
    SerializedNode::Element {
        type_name: tag.to_string(),
        key: None,
        props: BTreeMap::new(),
        children: vec![],
    }
}

#[test]
fn identical_trees_produce_no_changes() {
    let a = leaf("div");
    let b = leaf("div");
    assert!(diff_serialized(&a, &b, &[]).is_empty());
    assert_eq!(structural_fingerprint(&a), structural_fingerprint(&b));
}

#[test]
fn prop_change_is_reported_by_path() {
    let mut old_props = BTreeMap::new();
    old_props.insert("text".to_string(), SerializedValue::Text("a".into()));
    let old = SerializedNode::Element {
        type_name: "Text".into(),
        key: None,
        props: old_props,
        children: vec![],
    };

    let mut new_props = BTreeMap::new();
    new_props.insert("text".to_string(), SerializedValue::Text("b".into()));
    let new = SerializedNode::Element {
        type_name: "Text".into(),
        key: None,
        props: new_props,
        children: vec![],
    };

    let changes = diff_serialized(&old, &new, &[]);
    assert_eq!(changes.len(), 1);
    match &changes[0] {
        WorkerChange::PropsChanged { path, changed } => {
            assert!(path.is_empty());
            assert_eq!(
                changed.get("text"),
                Some(&Some(SerializedValue::Text("b".into())))
            );
        }
        other => panic!("unexpected change: {other:?}"),
    }
}

#[test]
fn type_change_is_a_replace() {
    let old = leaf("div");
    let new = leaf("span");
    let changes = diff_serialized(&old, &new, &[]);
    assert_eq!(changes, vec![WorkerChange::Replaced { path: vec![] }]);
}

#[test]
fn nested_insertion_path_points_at_parent() {
    let old = SerializedNode::Element {
        type_name: "ul".into(),
        key: None,
        props: BTreeMap::new(),
        children: vec![leaf("li")],
    };
    let new = SerializedNode::Element {
        type_name: "ul".into(),
        key: None,
        props: BTreeMap::new(),
        children: vec![leaf("li"), leaf("li")],
    };

    let changes = diff_serialized(&old, &new, &[]);
    assert_eq!(
        changes,
        vec![WorkerChange::ChildInserted {
            path: vec![],
            index: 1
        }]
    );
}

#[test]
fn pool_offloads_and_returns_same_result_as_in_task() {
    let pool = WorkerPool::new(2);
    let old = leaf("div");
    let new = leaf("span");

    let fut = pool.diff(old.clone(), new.clone());
    let changes = futures::executor::block_on(fut).unwrap();
    assert_eq!(changes, diff_serialized(&old, &new, &[]));
}
