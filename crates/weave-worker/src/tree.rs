use std::collections::BTreeMap;

/// A function-free, serializable value. Event handlers never cross this
/// boundary (spec §5: "serialized, function-free tree representation").
#[derive(Clone, Debug, PartialEq)]
pub enum SerializedValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<SerializedValue>),
    Map(BTreeMap<String, SerializedValue>),
    /// Stands in for any prop the source tree could not serialize (most
    /// commonly an event handler). Two opaque values always compare equal
    /// to each other so the worker never reports a spurious prop change
    /// for something it couldn't see in the first place.
    Opaque,
}

/// A snapshot of one node, shaped the way `weave-core::Node` is, but with
/// components already resolved to their rendered element and handlers
/// erased to [`SerializedValue::Opaque`].
#[derive(Clone, Debug, PartialEq)]
pub enum SerializedNode {
    Element {
        type_name: String,
        key: Option<String>,
        props: BTreeMap<String, SerializedValue>,
        children: Vec<SerializedNode>,
    },
    Fragment {
        children: Vec<SerializedNode>,
    },
    Empty,
}

impl SerializedNode {
    pub fn children(&self) -> &[SerializedNode] {
        match self {
            SerializedNode::Element { children, .. } => children,
            SerializedNode::Fragment { children, .. } => children,
            SerializedNode::Empty => &[],
        }
    }
}

/// One change the offloaded diff found, addressed by a path of child
/// indices from the root of the *new* tree.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerChange {
    PropsChanged {
        path: Vec<usize>,
        changed: BTreeMap<String, Option<SerializedValue>>,
    },
    ChildInserted {
        path: Vec<usize>,
        index: usize,
    },
    ChildRemoved {
        path: Vec<usize>,
        index: usize,
    },
    Replaced {
        path: Vec<usize>,
    },
}

/// A cheap, order-insensitive structural fingerprint used for the
/// quick structural-equality pre-check described in spec §9 (the
/// worker's own "no changes detected" signal must never gate the
/// in-task fallback check).
pub fn structural_fingerprint(node: &SerializedNode) -> u64 {
    fn walk(node: &SerializedNode, acc: &mut u64) {
        use std::hash::{Hash, Hasher};
        let mut hasher = rustc_hash_fallback_hasher();
        match node {
            SerializedNode::Element {
                type_name,
                children,
                ..
            } => {
                0u8.hash(&mut hasher);
                type_name.hash(&mut hasher);
                children.len().hash(&mut hasher);
                *acc ^= hasher.finish();
                for child in children {
                    walk(child, acc);
                }
            }
            SerializedNode::Fragment { children } => {
                1u8.hash(&mut hasher);
                children.len().hash(&mut hasher);
                *acc ^= hasher.finish();
                for child in children {
                    walk(child, acc);
                }
            }
            SerializedNode::Empty => {
                2u8.hash(&mut hasher);
                *acc ^= hasher.finish();
            }
        }
    }

    fn rustc_hash_fallback_hasher() -> std::collections::hash_map::DefaultHasher {
        std::collections::hash_map::DefaultHasher::new()
    }

    let mut acc = 0u64;
    walk(node, &mut acc);
    acc
}
