use crate::node::{Node, NodeKey, NodeTemplate};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::collections::VecDeque;
use weave_bridge::{PropMap, Value};

/// A pointer-identity stand-in for "the fresh template produced by this
/// render pass" (spec §4.3: keyed by `(old_node_identity,
/// new_node_identity)`). Templates are never interned into the arena until
/// they're actually mounted, so they have no `NodeKey`; their address is
/// stable for the duration of the one reconciliation call that reads them,
/// which is the only timeframe the cache needs to disambiguate repeated
/// look-ahead probes of the same pair (spec §4.5.2's two-pointer matcher
/// re-examines candidates as it scans).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TemplateId(usize);

impl TemplateId {
    pub fn of(template: &NodeTemplate) -> Self {
        TemplateId(template as *const NodeTemplate as usize)
    }
}

/// Bounded `(old_identity, new_identity) → score` memo (spec §4.3: "max
/// 1000 entries... Eviction is strict LRU"). Caches only
/// [`SimilarityCache::structural_similarity`], the more expensive of the
/// two scores; `props_similarity` is cheap enough to recompute each call.
pub struct SimilarityCache {
    capacity: usize,
    map: FxHashMap<(NodeKey, TemplateId), f64>,
    order: VecDeque<(NodeKey, TemplateId)>,
}

impl SimilarityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: FxHashMap::default(),
            order: VecDeque::new(),
        }
    }

    fn touch(&mut self, key: (NodeKey, TemplateId)) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }

    fn get(&mut self, key: (NodeKey, TemplateId)) -> Option<f64> {
        let value = self.map.get(&key).copied();
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn insert(&mut self, key: (NodeKey, TemplateId), value: f64) {
        if !self.map.contains_key(&key) && self.map.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.map.remove(&evicted);
            }
        }
        self.map.insert(key, value);
        self.touch(key);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    /// Memoized structural similarity between an already-materialized
    /// Element and a not-yet-mounted Element template (spec §4.4.1).
    pub fn structural_similarity(
        &mut self,
        arena: &SlotMap<NodeKey, Node>,
        old: NodeKey,
        new: &NodeTemplate,
    ) -> f64 {
        let key = (old, TemplateId::of(new));
        if let Some(score) = self.get(key) {
            return score;
        }
        let score = compute_structural_similarity(arena, old, new);
        self.insert(key, score);
        score
    }
}

/// A child's type signature for the LCS comparison (spec §4.4.1).
fn node_signature(node: &Node) -> String {
    match node {
        Node::Element(n) => format!("E:{}", n.type_name),
        Node::Stateful(n) => format!("S:{}", n.runtime_type),
        Node::Stateless(n) => format!("L:{}", n.runtime_type),
        other => format!("U:{}", other.runtime_type()),
    }
}

fn template_signature(template: &NodeTemplate) -> String {
    match template {
        NodeTemplate::Element { type_name, .. } => format!("E:{type_name}"),
        NodeTemplate::Stateful { instance, .. } => format!("S:{}", instance.borrow().runtime_type()),
        NodeTemplate::Stateless { component, .. } => format!("L:{}", component.runtime_type()),
        other => format!("U:{}", other.runtime_type()),
    }
}

fn compute_structural_similarity(arena: &SlotMap<NodeKey, Node>, old: NodeKey, new: &NodeTemplate) -> f64 {
    let old_children: &[NodeKey] = arena[old].children().map(|c| c.as_slice()).unwrap_or(&[]);
    let new_children: &[NodeTemplate] = match new {
        NodeTemplate::Element { children, .. } | NodeTemplate::Fragment { children, .. } => children.as_slice(),
        _ => &[],
    };

    if old_children.is_empty() && new_children.is_empty() {
        return 1.0;
    }
    if old_children.is_empty() || new_children.is_empty() {
        return 0.2;
    }

    let old_sigs: Vec<String> = old_children.iter().map(|k| node_signature(&arena[*k])).collect();
    let new_sigs: Vec<String> = new_children.iter().map(template_signature).collect();

    let lcs_len = longest_common_subsequence_len(&old_sigs, &new_sigs);
    let children_score = lcs_len as f64 / old_sigs.len().max(new_sigs.len()) as f64;

    let props_score = match (&arena[old], new) {
        (Node::Element(a), NodeTemplate::Element { props, .. }) => props_similarity(&a.props, props),
        _ => 1.0,
    };

    0.7 * children_score + 0.3 * props_score
}

/// Space-optimized two-row DP, O(n·m) time, O(min(n,m)) space (spec §4.4.1).
fn longest_common_subsequence_len(a: &[String], b: &[String]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];

    for lv in long {
        for (j, sv) in short.iter().enumerate() {
            curr[j + 1] = if lv == sv {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// Over non-function props only: `matching / total_union_keys` with deep
/// equality (spec §4.4.2). Empty-on-both = 1.0, empty-on-one = 0.0.
pub fn props_similarity(old_props: &PropMap, new_props: &PropMap) -> f64 {
    let is_value_prop = |v: &Value| !matches!(v, Value::Handler(_));

    let old_keys: std::collections::HashSet<&str> = old_props
        .iter()
        .filter(|(_, v)| is_value_prop(v))
        .map(|(k, _)| k.as_str())
        .collect();
    let new_keys: std::collections::HashSet<&str> = new_props
        .iter()
        .filter(|(_, v)| is_value_prop(v))
        .map(|(k, _)| k.as_str())
        .collect();

    if old_keys.is_empty() && new_keys.is_empty() {
        return 1.0;
    }

    let union: std::collections::HashSet<&str> = old_keys.union(&new_keys).copied().collect();
    if union.is_empty() {
        return 0.0;
    }

    let matching = old_keys
        .iter()
        .filter(|k| new_keys.contains(*k) && old_props.get(**k) == new_props.get(**k))
        .count();

    matching as f64 / union.len() as f64
}
